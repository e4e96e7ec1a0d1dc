//! Data models for the Ledger Engine.
//!
//! The `models` module defines the serialisable structs and enums
//! representing the five record collections delivered by the document
//! store (employees, attendance, inventory, sales, purchases) plus
//! the engine's result types.  The store guarantees no load-time
//! validation, so every monetary and quantity field is deserialised
//! through a lenient "numeric-or-zero" path: numbers and numeric
//! strings are accepted, anything else (null, missing, garbage)
//! coerces to zero, and negative magnitudes clamp to zero.  Signed
//! results (`net_pay`, `net_profit`) are computed, never parsed.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;

use crate::period::{DateValue, Period, ReportRange};

/// Coerces a loosely-typed store value into a non-negative amount.
///
/// Mirrors the tolerance of the surrounding application: `Number(x)
/// || 0` with an added clamp, since every monetary input is a
/// magnitude.
fn coerce_amount(value: &Value) -> Decimal {
    let parsed = match value {
        // Going through the number's string form keeps the decimal
        // digits exact instead of routing through f64.
        Value::Number(n) => Decimal::from_str(&n.to_string()).ok(),
        Value::String(s) => Decimal::from_str(s.trim())
            .ok()
            .or_else(|| Decimal::from_scientific(s.trim()).ok()),
        _ => None,
    };
    match parsed {
        Some(d) if d.is_sign_negative() => Decimal::ZERO,
        Some(d) => d,
        None => Decimal::ZERO,
    }
}

/// Serde adaptor for [`coerce_amount`]; pair with `#[serde(default)]`
/// so absent fields also land on zero.
pub(crate) fn lenient_amount<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().map(coerce_amount).unwrap_or(Decimal::ZERO))
}

fn default_string() -> String {
    String::new()
}

/// An employee directory record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    /// Stable identifier; attendance records and payroll overrides
    /// reference this, never the display name.
    pub id: String,
    #[serde(default = "default_string")]
    pub name: String,
    #[serde(default = "default_string")]
    pub role: String,
    #[serde(default = "default_string")]
    pub dept: String,
    #[serde(default = "default_string")]
    pub location: String,
    #[serde(default = "default_string")]
    pub shift: String,
    /// Monthly base salary.
    #[serde(default, deserialize_with = "lenient_amount")]
    pub salary: Decimal,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub bonus: Decimal,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub overtime: Decimal,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub advance_salary: Decimal,
    /// Manual hourly deduction count, converted to currency at the
    /// employee's hourly rate unless an override freezes an amount.
    #[serde(default, deserialize_with = "lenient_amount")]
    pub deduction_hours: Decimal,
    #[serde(default)]
    pub status: Option<String>,
}

/// Daily attendance outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttendanceStatus {
    #[serde(rename = "On Time")]
    OnTime,
    Late,
    Absent,
}

/// One attendance event for one employee on one day.
///
/// The store enforces at most one record per (employee, date) at
/// write time; the engine does not re-check.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    /// Stable foreign key into the employee directory.
    pub employee_id: String,
    /// Denormalized display name, resolved at read time; never used
    /// for matching.
    #[serde(default = "default_string")]
    pub employee_name: String,
    pub date: DateValue,
    pub status: AttendanceStatus,
    /// Only meaningful when `status` is `Late`.
    #[serde(default, deserialize_with = "lenient_amount")]
    pub late_hours: Decimal,
    /// Name of the employee this shift covered for, if any.
    #[serde(default)]
    pub replacement_for: Option<String>,
}

/// A frozen, manually-adjustable snapshot of one employee's pay
/// figures for one specific month.  When present its fields take
/// precedence over the live directory defaults; attendance-derived
/// deductions are still recomputed from the ledger.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayrollOverride {
    #[serde(default, deserialize_with = "lenient_amount")]
    pub salary: Decimal,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub bonus: Decimal,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub overtime: Decimal,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub advance: Decimal,
    /// A direct currency amount, unlike the hour-based directory
    /// default.  The override freezes a computed or adjusted figure.
    #[serde(default, deserialize_with = "lenient_amount")]
    pub deductions: Decimal,
}

/// A stock item; doubles as the cost basis for COGS.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    #[serde(default = "default_string")]
    pub id: String,
    #[serde(default = "default_string")]
    pub name: String,
    #[serde(default = "default_string")]
    pub location: String,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub buy_price: Decimal,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub sell_price: Decimal,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub quantity: Decimal,
}

/// A line item on a completed sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleLine {
    /// Stable inventory id captured at sale time.  Preferred for the
    /// COGS lookup; older records fall back to matching by name.
    #[serde(default)]
    pub item_id: Option<String>,
    #[serde(default = "default_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub price: Decimal,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub qty: Decimal,
}

/// A completed point-of-sale transaction.  Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleRecord {
    #[serde(default = "default_string")]
    pub invoice_id: String,
    #[serde(default = "default_string")]
    pub order_type: String,
    /// Free-form in the store; bucketed into Cash/Visa/Online/other
    /// at aggregation time.
    #[serde(default = "default_string")]
    pub payment_method: String,
    #[serde(default = "default_string")]
    pub customer: String,
    #[serde(default)]
    pub items: Vec<SaleLine>,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub subtotal: Decimal,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub discount: Decimal,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub tax_rate: Decimal,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub tax_amount: Decimal,
    /// Final total after discount and tax.
    #[serde(default, deserialize_with = "lenient_amount")]
    pub amount: Decimal,
    #[serde(default = "default_string")]
    pub location: String,
    #[serde(default = "default_string")]
    pub sold_by: String,
    pub date: DateValue,
}

/// An inventory acquisition or expense record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRecord {
    #[serde(default = "default_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub amount: Decimal,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub quantity: Decimal,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub buy_price: Decimal,
    #[serde(default = "default_string")]
    pub location: String,
    pub date: DateValue,
    /// e.g. "Inventory Add", "Stock Increase".
    #[serde(default = "default_string", rename = "type")]
    pub kind: String,
}

/// Currency code and locale for the presentation layer.  Carried as
/// an explicit value and echoed through results, never consulted by
/// the calculators themselves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportingContext {
    pub currency: String,
    #[serde(default = "default_string")]
    pub locale: String,
}

/// Itemized outcome of one employee's payroll for one month.
///
/// All component figures are non-negative magnitudes; `net_pay` is
/// signed and may legitimately go below zero, in which case it must
/// be surfaced to the consumer, not clamped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayrollResult {
    pub base_salary: Decimal,
    pub bonus: Decimal,
    pub overtime: Decimal,
    pub late_deduction: Decimal,
    pub absent_deduction: Decimal,
    pub manual_deduction: Decimal,
    pub advance: Decimal,
    pub total_deductions: Decimal,
    pub gross_pay: Decimal,
    pub net_pay: Decimal,
}

/// Input to a whole-directory payroll run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayRunInput {
    /// Target pay period, `YYYY-MM`.
    pub month: String,
    /// When set, only employees assigned to this site are paid out.
    #[serde(default)]
    pub location: Option<String>,
    pub employees: Vec<Employee>,
    #[serde(default)]
    pub attendance: Vec<AttendanceRecord>,
    /// Manual per-month overrides keyed by employee id.
    #[serde(default)]
    pub overrides: HashMap<String, PayrollOverride>,
    #[serde(default)]
    pub context: Option<ReportingContext>,
}

/// The payroll outcome for a single employee within a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeePayResult {
    pub employee: Employee,
    pub breakdown: PayrollResult,
}

/// The aggregate result of a payroll run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayRunResult {
    pub month: String,
    pub results: Vec<EmployeePayResult>,
    #[serde(default)]
    pub context: Option<ReportingContext>,
}

/// Input to the profit-and-loss aggregator: a period, its anchor and
/// the record snapshots to aggregate over.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlRequest {
    pub period: Period,
    /// A day for Daily/Weekly, `YYYY-MM` for Monthly, `YYYY` for Yearly.
    pub anchor: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub sales: Vec<SaleRecord>,
    #[serde(default)]
    pub purchases: Vec<PurchaseRecord>,
    #[serde(default)]
    pub inventory: Vec<InventoryItem>,
    #[serde(default)]
    pub employees: Vec<Employee>,
    #[serde(default)]
    pub context: Option<ReportingContext>,
}

/// Revenue bucketed by payment method.  Methods outside the known
/// set land in `other` so the total always equals the sum of the
/// buckets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueByMethod {
    pub cash: Decimal,
    pub visa: Decimal,
    pub online: Decimal,
    pub other: Decimal,
    pub total: Decimal,
}

/// One sold line in the detail table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SoldLineDetail {
    pub invoice_id: String,
    pub name: String,
    pub qty: Decimal,
    pub unit_sell_price: Decimal,
    /// Zero when the inventory lookup misses.
    pub unit_buy_price: Decimal,
    pub line_total: Decimal,
    pub line_cost: Decimal,
    pub line_profit: Decimal,
}

/// Totals row for the sold-lines detail table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SoldTotals {
    pub qty: Decimal,
    pub total: Decimal,
    pub cost: Decimal,
    pub profit: Decimal,
}

/// One purchase in the detail table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseDetail {
    pub name: String,
    pub quantity: Decimal,
    /// `amount / quantity`, or the raw amount when quantity is
    /// absent or zero.
    pub unit_cost: Decimal,
    pub amount: Decimal,
}

/// Totals row for the purchases detail table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseTotals {
    pub quantity: Decimal,
    pub amount: Decimal,
}

/// A structured profit-and-loss statement for one report range.
///
/// Expense figures are positive magnitudes in their own fields; the
/// consumer applies the ledger sign convention when folding them into
/// a single list.  `net_profit` is signed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlStatement {
    pub range: ReportRange,
    pub revenue: RevenueByMethod,
    pub total_cogs: Decimal,
    pub gross_profit: Decimal,
    /// `gross_profit / revenue.total`, zero when revenue is zero.
    pub gross_margin: Decimal,
    pub payroll_by_department: BTreeMap<String, Decimal>,
    pub total_payroll_expenses: Decimal,
    pub total_other_expenses: Decimal,
    pub total_operating_expenses: Decimal,
    pub net_profit: Decimal,
    /// `net_profit / revenue.total`, zero when revenue is zero.
    pub net_margin: Decimal,
    pub sold_lines: Vec<SoldLineDetail>,
    pub sold_totals: SoldTotals,
    pub purchase_lines: Vec<PurchaseDetail>,
    pub purchase_totals: PurchaseTotals,
    #[serde(default)]
    pub context: Option<ReportingContext>,
}
