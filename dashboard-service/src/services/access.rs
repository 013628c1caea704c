//! Role-based permission checks and invoice visibility.
//!
//! Permissions come from the static per-role table on [`Role`]. Unknown
//! role codes resolve to no permissions at all, so anything unrecognized is
//! denied.

use service_core::error::AppError;

use crate::models::{Actor, Invoice, InvoiceWithDetails, Role};

/// Check whether an actor holds a permission token.
///
/// An absent or inactive actor holds nothing. The `all` token short-circuits
/// every other check.
pub fn has_permission(actor: Option<&Actor>, permission: &str) -> bool {
    let Some(actor) = actor else {
        return false;
    };
    if !actor.is_active {
        return false;
    }

    let permissions = actor.role().map(|r| r.permissions()).unwrap_or(&[]);
    permissions.contains(&"all") || permissions.contains(&permission)
}

/// Require a permission, mapping a miss to `Forbidden`.
pub fn require_permission(actor: &Actor, permission: &str) -> Result<(), AppError> {
    if has_permission(Some(actor), permission) {
        Ok(())
    } else {
        Err(AppError::Forbidden(anyhow::anyhow!(
            "Missing permission: {}",
            permission
        )))
    }
}

/// Restrict an invoice collection to what the actor may see.
///
/// Sales officers see only invoices they created; every other role sees the
/// full collection. Applied before any search/status/date filtering.
pub fn visible_invoices(
    actor: &Actor,
    invoices: Vec<InvoiceWithDetails>,
) -> Vec<InvoiceWithDetails> {
    match actor.role() {
        Some(Role::SalesOfficer) => invoices
            .into_iter()
            .filter(|entry| entry.invoice.created_by == actor.user_id)
            .collect(),
        _ => invoices,
    }
}

/// Whether the actor may mutate this invoice (status changes, line item
/// replacement). Admins may edit anything; sales officers only their own.
pub fn can_edit_invoice(actor: &Actor, invoice: &Invoice) -> bool {
    if has_permission(Some(actor), "all") {
        return true;
    }
    matches!(actor.role(), Some(Role::SalesOfficer)) && invoice.created_by == actor.user_id
}

/// Require edit rights on an invoice, mapping a miss to `Forbidden`.
pub fn require_edit(actor: &Actor, invoice: &Invoice) -> Result<(), AppError> {
    if can_edit_invoice(actor, invoice) {
        Ok(())
    } else {
        Err(AppError::Forbidden(anyhow::anyhow!(
            "Not allowed to edit invoice {}",
            invoice.invoice_number
        )))
    }
}
