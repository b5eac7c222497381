// Fixed-rate, fixed-term vehicle finance estimates

use serde::Serialize;

use crate::models::FinanceInputs;

/// Breakdown shown by the finance calculator.
#[derive(Debug, Serialize, Clone, Copy, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FinanceQuote {
    pub principal: u64,
    pub balloon_amount: u64,
    pub financed_amount: u64,
    pub monthly_payment: u64,
    // Instalments plus the balloon settled at the end of the term
    pub total_repayable: u64,
}

// Negative, NaN and infinite inputs count as zero
fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

struct Loan {
    principal: f64,
    balloon: f64,
    financed: f64,
}

fn loan(inputs: &FinanceInputs) -> Loan {
    let principal = non_negative(inputs.price) - non_negative(inputs.deposit);
    let balloon = principal * (non_negative(inputs.balloon_percent) / 100.0);
    Loan {
        principal,
        balloon,
        financed: principal - balloon,
    }
}

/// Estimated monthly instalment, rounded to the nearest rand.
///
/// Returns 0 when the deposit and balloon cover the whole price. At 0% interest
/// the financed amount is split evenly over the term; a zero-month term makes
/// the whole financed amount due at once.
pub fn monthly_payment(inputs: &FinanceInputs) -> u64 {
    let financed = loan(inputs).financed;
    if financed <= 0.0 {
        return 0;
    }

    let monthly_rate = non_negative(inputs.annual_interest_rate_percent) / 100.0 / 12.0;
    let term = inputs.term_months;

    let payment = if term == 0 {
        financed
    } else if monthly_rate == 0.0 {
        financed / f64::from(term)
    } else {
        financed * monthly_rate / (1.0 - (1.0 + monthly_rate).powf(-f64::from(term)))
    };

    if payment.is_finite() {
        payment.round() as u64
    } else {
        0
    }
}

pub fn quote(inputs: &FinanceInputs) -> FinanceQuote {
    let loan = loan(inputs);
    let monthly = monthly_payment(inputs);
    let balloon_amount = loan.balloon.max(0.0).round() as u64;
    FinanceQuote {
        principal: loan.principal.max(0.0).round() as u64,
        balloon_amount,
        financed_amount: loan.financed.max(0.0).round() as u64,
        monthly_payment: monthly,
        total_repayable: monthly * u64::from(inputs.term_months.max(1)) + balloon_amount,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(price: f64, deposit: f64, rate: f64, term: u32, balloon: f64) -> FinanceInputs {
        FinanceInputs {
            price,
            deposit,
            annual_interest_rate_percent: rate,
            term_months: term,
            balloon_percent: balloon,
        }
    }

    #[test]
    fn standard_amortization() {
        // 300000 * r / (1 - (1 + r)^-60), r = 0.1175 / 12
        assert_eq!(monthly_payment(&inputs(300_000.0, 0.0, 11.75, 60, 0.0)), 6635);
        assert_eq!(monthly_payment(&inputs(300_000.0, 0.0, 11.0, 60, 0.0)), 6523);
    }

    #[test]
    fn deposit_and_balloon_reduce_the_instalment() {
        // principal 250000, balloon 50000, financed 200000
        assert_eq!(monthly_payment(&inputs(300_000.0, 50_000.0, 11.0, 60, 20.0)), 4348);
    }

    #[test]
    fn zero_interest_divides_evenly() {
        assert_eq!(monthly_payment(&inputs(120_000.0, 0.0, 0.0, 60, 0.0)), 2000);
    }

    #[test]
    fn zero_term_is_due_at_once() {
        assert_eq!(monthly_payment(&inputs(100_000.0, 10_000.0, 11.0, 0, 0.0)), 90_000);
    }

    #[test]
    fn covered_loans_cost_nothing() {
        assert_eq!(monthly_payment(&inputs(200_000.0, 200_000.0, 11.0, 60, 0.0)), 0);
        assert_eq!(monthly_payment(&inputs(200_000.0, 250_000.0, 11.0, 60, 0.0)), 0);
        assert_eq!(monthly_payment(&inputs(200_000.0, 0.0, 11.0, 60, 100.0)), 0);
    }

    #[test]
    fn garbage_inputs_do_not_propagate() {
        assert_eq!(monthly_payment(&inputs(f64::NAN, 0.0, 11.0, 60, 0.0)), 0);
        assert_eq!(monthly_payment(&inputs(100_000.0, -5.0, f64::INFINITY, 60, 0.0)), 1667);
    }

    #[test]
    fn quote_breakdown() {
        let q = quote(&inputs(300_000.0, 50_000.0, 11.0, 60, 20.0));
        assert_eq!(q.principal, 250_000);
        assert_eq!(q.balloon_amount, 50_000);
        assert_eq!(q.financed_amount, 200_000);
        assert_eq!(q.monthly_payment, 4348);
        assert_eq!(q.total_repayable, 4348 * 60 + 50_000);
    }
}
