//! Profit-and-loss aggregation.
//!
//! The `pnl` module folds snapshots of the sales journal, purchase
//! journal, inventory catalog and employee directory into a
//! [`PlStatement`] for one report range.  Aggregation is tolerant by
//! policy: a sold line whose inventory item cannot be found costs
//! zero, and a record whose date cannot be read is skipped with a
//! warning.  Only a malformed period anchor aborts the computation.
//!
//! One deliberate divergence from the payroll calculator: the payroll
//! operating-expense line is a present-tense snapshot of the current
//! directory (salary + bonus + overtime), not the period-accurate
//! payroll with overrides.  Past-period statements therefore shift
//! when salaries change.  Known reporting inaccuracy, kept as-is
//! pending a product decision.

use rust_decimal::Decimal;
use std::collections::BTreeMap;
use tracing::warn;

use crate::error::Result;
use crate::models::{
    InventoryItem, PlRequest, PlStatement, PurchaseDetail, PurchaseTotals, RevenueByMethod,
    SaleLine, SoldLineDetail, SoldTotals,
};
use crate::period::ReportRange;

/// Ratio with a zero-denominator guard: margins resolve to zero
/// rather than NaN/Infinity when there is no revenue.
fn safe_ratio(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator.is_zero() {
        Decimal::ZERO
    } else {
        numerator / denominator
    }
}

/// Finds the cost basis for a sold line.
///
/// Prefers the stable item id captured at sale time; older records
/// fall back to a first-match lookup by name, which conflates items
/// sharing a name across sites.
fn cost_basis<'a>(inventory: &'a [InventoryItem], line: &SaleLine) -> Option<&'a InventoryItem> {
    if let Some(id) = line.item_id.as_deref().filter(|id| !id.is_empty()) {
        if let Some(item) = inventory.iter().find(|item| item.id == id) {
            return Some(item);
        }
    }
    inventory.iter().find(|item| item.name == line.name)
}

fn location_matches(record_location: &str, filter: Option<&str>) -> bool {
    filter.map(|l| record_location == l).unwrap_or(true)
}

/// Aggregates a profit-and-loss statement for the request's period.
///
/// Empty snapshots are valid and produce an all-zero statement.  The
/// computation is pure: the input collections are never mutated, and
/// re-running on an unchanged snapshot yields identical totals.
pub fn compute_profit_and_loss(request: &PlRequest) -> Result<PlStatement> {
    let range: ReportRange = request.period.resolve(&request.anchor)?;
    let location = request.location.as_deref().filter(|l| !l.is_empty());

    // Revenue by payment method, plus COGS and the sold-line detail
    // table, in one pass over the filtered sales.
    let mut revenue = RevenueByMethod::default();
    let mut sold_lines = Vec::new();
    let mut sold_totals = SoldTotals::default();
    for sale in &request.sales {
        if !location_matches(&sale.location, location) {
            continue;
        }
        let Some(ts) = sale.date.timestamp() else {
            warn!(invoice = %sale.invoice_id, "skipping sale with unreadable date");
            continue;
        };
        if !range.contains(ts) {
            continue;
        }

        match sale.payment_method.trim().to_ascii_lowercase().as_str() {
            "cash" => revenue.cash += sale.amount,
            "visa" => revenue.visa += sale.amount,
            "online" => revenue.online += sale.amount,
            _ => revenue.other += sale.amount,
        }
        revenue.total += sale.amount;

        for line in &sale.items {
            // A miss costs zero; deleted or renamed inventory
            // understates COGS rather than failing the report.
            let unit_buy_price = match cost_basis(&request.inventory, line) {
                Some(item) => item.buy_price,
                None => {
                    warn!(item = %line.name, invoice = %sale.invoice_id,
                          "no inventory match for sold line, costing zero");
                    Decimal::ZERO
                }
            };
            let line_total = line.price * line.qty;
            let line_cost = unit_buy_price * line.qty;
            sold_totals.qty += line.qty;
            sold_totals.total += line_total;
            sold_totals.cost += line_cost;
            sold_totals.profit += line_total - line_cost;
            sold_lines.push(SoldLineDetail {
                invoice_id: sale.invoice_id.clone(),
                name: line.name.clone(),
                qty: line.qty,
                unit_sell_price: line.price,
                unit_buy_price,
                line_total,
                line_cost,
                line_profit: line_total - line_cost,
            });
        }
    }
    let total_cogs = sold_totals.cost;
    let gross_profit = revenue.total - total_cogs;

    // Payroll expense: current directory snapshot grouped by
    // department.  Present-tense by design; see the module docs.
    let mut payroll_by_department: BTreeMap<String, Decimal> = BTreeMap::new();
    let mut total_payroll_expenses = Decimal::ZERO;
    for emp in &request.employees {
        if !location_matches(&emp.location, location) {
            continue;
        }
        let cost = emp.salary + emp.bonus + emp.overtime;
        *payroll_by_department.entry(emp.dept.clone()).or_default() += cost;
        total_payroll_expenses += cost;
    }

    // Purchase expenses plus their detail table.
    let mut purchase_lines = Vec::new();
    let mut purchase_totals = PurchaseTotals::default();
    for purchase in &request.purchases {
        if !location_matches(&purchase.location, location) {
            continue;
        }
        let Some(ts) = purchase.date.timestamp() else {
            warn!(purchase = %purchase.name, "skipping purchase with unreadable date");
            continue;
        };
        if !range.contains(ts) {
            continue;
        }
        let unit_cost = if purchase.quantity.is_zero() {
            purchase.amount
        } else {
            purchase.amount / purchase.quantity
        };
        purchase_totals.quantity += purchase.quantity;
        purchase_totals.amount += purchase.amount;
        purchase_lines.push(PurchaseDetail {
            name: purchase.name.clone(),
            quantity: purchase.quantity,
            unit_cost,
            amount: purchase.amount,
        });
    }
    let total_other_expenses = purchase_totals.amount;

    let total_operating_expenses = total_payroll_expenses + total_other_expenses;
    let net_profit = gross_profit - total_operating_expenses;

    Ok(PlStatement {
        range,
        gross_margin: safe_ratio(gross_profit, revenue.total),
        net_margin: safe_ratio(net_profit, revenue.total),
        revenue,
        total_cogs,
        gross_profit,
        payroll_by_department,
        total_payroll_expenses,
        total_other_expenses,
        total_operating_expenses,
        net_profit,
        sold_lines,
        sold_totals,
        purchase_lines,
        purchase_totals,
        context: request.context.clone(),
    })
}
