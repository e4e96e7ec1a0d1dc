//! Payroll computation engine.
//!
//! The `payroll` module turns an employee, a target pay month and the
//! attendance ledger into an itemized [`PayrollResult`], and a whole
//! [`PayRunInput`] into a [`PayRunResult`].  It uses the [`rayon`]
//! crate to parallelise per-employee calculations across multiple CPU
//! cores; every calculation is a pure function of its inputs, so runs
//! are safe to parallelise and bit-identical on repetition.
//!
//! Two business rules worth calling out:
//!
//! * The hourly rate for hour-based deductions is `base_salary / 360`
//!   (30 days at a 12-hour shift).  The divisor is fixed policy, not
//!   derived from the employee's actual shift.
//! * Once a month has an override it is insulated from later edits to
//!   the employee's directory profile.  Attendance-derived deductions
//!   are still recomputed live from the ledger, against whichever
//!   base salary is in effect.

use rayon::prelude::*;
use rust_decimal::Decimal;

use crate::error::{EngineError, Result};
use crate::models::{
    AttendanceRecord, AttendanceStatus, Employee, EmployeePayResult, PayRunInput, PayRunResult,
    PayrollOverride, PayrollResult,
};
use crate::period::PayMonth;

/// 30 days at a 12-hour shift; the denominator for hour-based deductions.
const DEDUCTION_HOURS_PER_MONTH: Decimal = Decimal::from_parts(360, 0, 0, false, 0);

/// Flat daily-salary divisor for absence deductions.
const DAYS_PER_MONTH: Decimal = Decimal::from_parts(30, 0, 0, false, 0);

/// Computes one employee's pay for one month.
///
/// Base figures come from `ovr` when present, otherwise from the
/// directory record.  Late and absent deductions are always derived
/// from `attendance`, filtered to this employee and this month.  A
/// zero base salary is legal: every rate-derived figure collapses to
/// zero and the result is still produced.
pub fn compute_payroll(
    employee: &Employee,
    month: &PayMonth,
    attendance: &[AttendanceRecord],
    ovr: Option<&PayrollOverride>,
) -> PayrollResult {
    let (base_salary, bonus, overtime) = match ovr {
        Some(o) => (o.salary, o.bonus, o.overtime),
        None => (employee.salary, employee.bonus, employee.overtime),
    };

    // 360 and 30 are non-zero constants, so plain division is safe;
    // a zero base salary just yields zero rates.
    let hourly_rate = base_salary / DEDUCTION_HOURS_PER_MONTH;
    let daily_rate = base_salary / DAYS_PER_MONTH;

    let mut late_deduction = Decimal::ZERO;
    let mut absent_deduction = Decimal::ZERO;
    for record in attendance {
        if record.employee_id != employee.id || !month.contains(&record.date) {
            continue;
        }
        match record.status {
            AttendanceStatus::Late => {
                // A record marked Late with no hours chosen contributes
                // nothing; the hours are an explicit entry.
                let cost = record.late_hours * hourly_rate;
                if cost > Decimal::ZERO {
                    late_deduction += cost;
                }
            }
            AttendanceStatus::Absent => {
                absent_deduction += daily_rate;
            }
            AttendanceStatus::OnTime => {}
        }
    }

    // The directory default is hour-based; an override freezes a
    // direct currency amount.  Different units by design.
    let manual_deduction = match ovr {
        Some(o) => o.deductions,
        None => employee.deduction_hours * hourly_rate,
    };
    let advance = match ovr {
        Some(o) => o.advance,
        None => employee.advance_salary,
    };

    let gross_pay = base_salary + bonus + overtime;
    let total_deductions = late_deduction + absent_deduction + manual_deduction + advance;

    PayrollResult {
        base_salary,
        bonus,
        overtime,
        late_deduction,
        absent_deduction,
        manual_deduction,
        advance,
        total_deductions,
        gross_pay,
        // Signed; a net below zero is financially meaningful and is
        // surfaced as-is.
        net_pay: gross_pay - total_deductions,
    }
}

/// Runs payroll for a whole directory snapshot.
///
/// Fails fast with [`EngineError::InvalidInput`] when the month is
/// malformed; once inputs are validated no individual employee can
/// fail.  Employees are processed in parallel.
pub fn run_payroll(input: PayRunInput) -> Result<PayRunResult> {
    let month: PayMonth = input.month.parse()?;
    let attendance = input.attendance;
    let overrides = input.overrides;
    let location = input.location.as_deref().filter(|l| !l.is_empty());

    let results: Vec<EmployeePayResult> = input
        .employees
        .into_par_iter()
        .filter(|emp| location.map(|l| emp.location == l).unwrap_or(true))
        .map(|employee| {
            let breakdown = compute_payroll(
                &employee,
                &month,
                &attendance,
                overrides.get(&employee.id),
            );
            EmployeePayResult { employee, breakdown }
        })
        .collect();

    Ok(PayRunResult {
        month: month.key(),
        results,
        context: input.context,
    })
}

/// Validates the pieces of a payroll request that the type system
/// cannot: a present employee id and a well-formed month.  Exposed
/// for callers that assemble [`compute_payroll`] arguments manually.
pub fn validate_payroll_inputs(employee: Option<&Employee>, month: &str) -> Result<PayMonth> {
    let employee = employee.ok_or_else(|| EngineError::InvalidInput("missing employee".into()))?;
    if employee.id.is_empty() {
        return Err(EngineError::InvalidInput("employee has no id".into()));
    }
    month.parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::period::DateValue;
    use rust_decimal_macros::dec;

    fn employee(salary: Decimal) -> Employee {
        Employee {
            id: "emp-1".into(),
            name: "Sara Fahmy".into(),
            role: "Supervisor".into(),
            dept: "Security".into(),
            location: "Headquarters".into(),
            shift: "Morning (12 Hours)".into(),
            salary,
            bonus: Decimal::ZERO,
            overtime: Decimal::ZERO,
            advance_salary: Decimal::ZERO,
            deduction_hours: Decimal::ZERO,
            status: None,
        }
    }

    fn late(day: &str, hours: Decimal) -> AttendanceRecord {
        AttendanceRecord {
            employee_id: "emp-1".into(),
            employee_name: "Sara Fahmy".into(),
            date: DateValue::Text(day.into()),
            status: AttendanceStatus::Late,
            late_hours: hours,
            replacement_for: None,
        }
    }

    fn absent(day: &str) -> AttendanceRecord {
        AttendanceRecord {
            employee_id: "emp-1".into(),
            employee_name: "Sara Fahmy".into(),
            date: DateValue::Text(day.into()),
            status: AttendanceStatus::Absent,
            late_hours: Decimal::ZERO,
            replacement_for: None,
        }
    }

    fn month() -> PayMonth {
        "2025-03".parse().unwrap()
    }

    #[test]
    fn late_hours_deduct_at_one_three_sixtieth() {
        let emp = employee(dec!(60000));
        let ledger = vec![late("2025-03-05", dec!(4))];
        let result = compute_payroll(&emp, &month(), &ledger, None);

        // 60000 / 360 = 166.67/hour; four hours late.
        assert_eq!(result.late_deduction.round_dp(2), dec!(666.67));
        assert_eq!(result.gross_pay, dec!(60000));
        assert_eq!(result.net_pay.round_dp(2), dec!(59333.33));
    }

    #[test]
    fn absence_deducts_a_flat_day() {
        let emp = employee(dec!(60000));
        let ledger = vec![late("2025-03-05", dec!(4)), absent("2025-03-06")];
        let result = compute_payroll(&emp, &month(), &ledger, None);

        assert_eq!(result.absent_deduction, dec!(2000));
        assert_eq!(result.net_pay.round_dp(2), dec!(57333.33));
    }

    #[test]
    fn override_figures_take_precedence_and_rates_follow() {
        let emp = employee(dec!(60000));
        let ledger = vec![late("2025-03-05", dec!(4)), absent("2025-03-06")];
        let ovr = PayrollOverride {
            salary: dec!(65000),
            bonus: dec!(1000),
            overtime: Decimal::ZERO,
            advance: dec!(2000),
            deductions: dec!(500),
        };
        let result = compute_payroll(&emp, &month(), &ledger, Some(&ovr));

        // Attendance deductions are recomputed against the override's
        // base salary, not the directory's.
        assert_eq!(result.gross_pay, dec!(66000));
        assert_eq!(result.late_deduction.round_dp(2), dec!(722.22));
        assert_eq!(result.absent_deduction.round_dp(2), dec!(2166.67));
        assert_eq!(result.manual_deduction, dec!(500));
        assert_eq!(result.advance, dec!(2000));
        assert_eq!(result.total_deductions.round_dp(2), dec!(5388.89));
        assert_eq!(result.net_pay.round_dp(2), dec!(60611.11));
    }

    #[test]
    fn directory_edits_after_an_override_change_nothing() {
        let ledger = vec![absent("2025-03-06")];
        let ovr = PayrollOverride {
            salary: dec!(30000),
            ..PayrollOverride::default()
        };

        let before = compute_payroll(&employee(dec!(60000)), &month(), &ledger, Some(&ovr));
        // HR later bumps the directory salary; the frozen month must
        // not move.
        let after = compute_payroll(&employee(dec!(90000)), &month(), &ledger, Some(&ovr));
        assert_eq!(before, after);
        assert_eq!(after.base_salary, dec!(30000));
        assert_eq!(after.absent_deduction, dec!(1000));
    }

    #[test]
    fn late_with_zero_hours_contributes_nothing() {
        let emp = employee(dec!(60000));
        let ledger = vec![late("2025-03-05", Decimal::ZERO)];
        let result = compute_payroll(&emp, &month(), &ledger, None);
        assert_eq!(result.late_deduction, Decimal::ZERO);
        assert_eq!(result.net_pay, dec!(60000));
    }

    #[test]
    fn records_outside_the_month_or_employee_are_ignored() {
        let emp = employee(dec!(60000));
        let mut other = absent("2025-03-10");
        other.employee_id = "emp-2".into();
        let ledger = vec![
            absent("2025-02-28"),
            absent("2025-04-01"),
            other,
            AttendanceRecord {
                employee_id: "emp-1".into(),
                employee_name: "Sara Fahmy".into(),
                date: DateValue::Text("whenever".into()),
                status: AttendanceStatus::Absent,
                late_hours: Decimal::ZERO,
                replacement_for: None,
            },
        ];
        let result = compute_payroll(&emp, &month(), &ledger, None);
        assert_eq!(result.absent_deduction, Decimal::ZERO);
    }

    #[test]
    fn zero_salary_is_legal_and_never_divides_by_zero() {
        let mut emp = employee(Decimal::ZERO);
        emp.deduction_hours = dec!(10);
        let ledger = vec![late("2025-03-05", dec!(4)), absent("2025-03-06")];
        let result = compute_payroll(&emp, &month(), &ledger, None);
        assert_eq!(result.late_deduction, Decimal::ZERO);
        assert_eq!(result.absent_deduction, Decimal::ZERO);
        assert_eq!(result.manual_deduction, Decimal::ZERO);
        assert_eq!(result.net_pay, Decimal::ZERO);
    }

    #[test]
    fn net_pay_may_go_negative() {
        let mut emp = employee(dec!(1000));
        emp.advance_salary = dec!(5000);
        let result = compute_payroll(&emp, &month(), &[], None);
        assert_eq!(result.net_pay, dec!(-4000));
    }

    #[test]
    fn manual_deduction_defaults_to_hours_at_rate() {
        let mut emp = employee(dec!(36000));
        emp.deduction_hours = dec!(3);
        let result = compute_payroll(&emp, &month(), &[], None);
        // 36000 / 360 = 100/hour.
        assert_eq!(result.manual_deduction, dec!(300));
    }

    #[test]
    fn run_rejects_malformed_months() {
        let input = PayRunInput {
            month: "March 2025".into(),
            location: None,
            employees: vec![employee(dec!(60000))],
            attendance: vec![],
            overrides: Default::default(),
            context: None,
        };
        assert!(matches!(run_payroll(input), Err(EngineError::InvalidInput(_))));
    }

    #[test]
    fn run_filters_by_location_and_applies_overrides_by_id() {
        let mut offsite = employee(dec!(40000));
        offsite.id = "emp-2".into();
        offsite.location = "Warehouse".into();

        let mut overrides = std::collections::HashMap::new();
        overrides.insert(
            "emp-1".to_string(),
            PayrollOverride { salary: dec!(65000), ..PayrollOverride::default() },
        );

        let input = PayRunInput {
            month: "2025-03".into(),
            location: Some("Headquarters".into()),
            employees: vec![employee(dec!(60000)), offsite],
            attendance: vec![],
            overrides,
            context: None,
        };
        let run = run_payroll(input).unwrap();
        assert_eq!(run.results.len(), 1);
        assert_eq!(run.results[0].breakdown.base_salary, dec!(65000));
        assert_eq!(run.month, "2025-03");
    }

    #[test]
    fn computation_is_deterministic() {
        let emp = employee(dec!(60000));
        let ledger = vec![late("2025-03-05", dec!(4)), absent("2025-03-06")];
        let first = compute_payroll(&emp, &month(), &ledger, None);
        let second = compute_payroll(&emp, &month(), &ledger, None);
        assert_eq!(first, second);
    }

    #[test]
    fn manual_validation_catches_missing_employee() {
        assert!(matches!(
            validate_payroll_inputs(None, "2025-03"),
            Err(EngineError::InvalidInput(_))
        ));
        let emp = employee(dec!(60000));
        assert!(validate_payroll_inputs(Some(&emp), "2025-03").is_ok());
        assert!(validate_payroll_inputs(Some(&emp), "2025-3").is_err());
    }
}
