//! Permission table and invoice visibility tests.

mod common;

use common::{actor, at, customer, invoice, InvoiceFixture};
use dashboard_service::models::{InvoiceStatus, Role};
use dashboard_service::services::access::{
    can_edit_invoice, has_permission, require_edit, require_permission, visible_invoices,
};

#[test]
fn only_admin_holds_the_all_token() {
    assert!(has_permission(Some(&actor(1, Role::Admin)), "all"));
    assert!(!has_permission(Some(&actor(2, Role::ManagingDirector)), "all"));
    assert!(!has_permission(Some(&actor(3, Role::SalesOfficer)), "all"));
    assert!(!has_permission(Some(&actor(4, Role::Storekeeper)), "all"));
}

#[test]
fn admin_passes_every_permission_check() {
    let admin = actor(1, Role::Admin);
    for token in ["create_invoice", "view_reports", "manage_users", "anything_at_all"] {
        assert!(has_permission(Some(&admin), token));
    }
}

#[test]
fn role_permission_table_matches_the_product_rules() {
    let director = actor(2, Role::ManagingDirector);
    assert!(has_permission(Some(&director), "view_all_invoices"));
    assert!(has_permission(Some(&director), "view_reports"));
    assert!(has_permission(Some(&director), "manage_users"));
    assert!(!has_permission(Some(&director), "create_invoice"));

    let sales = actor(3, Role::SalesOfficer);
    assert!(has_permission(Some(&sales), "create_invoice"));
    assert!(has_permission(Some(&sales), "view_own_invoices"));
    assert!(has_permission(Some(&sales), "edit_own_invoices"));
    assert!(!has_permission(Some(&sales), "view_reports"));

    let storekeeper = actor(4, Role::Storekeeper);
    assert!(has_permission(Some(&storekeeper), "view_invoices"));
    assert!(has_permission(Some(&storekeeper), "update_inventory"));
    assert!(!has_permission(Some(&storekeeper), "create_invoice"));
}

#[test]
fn missing_actor_is_denied_everything() {
    assert!(!has_permission(None, "all"));
    assert!(!has_permission(None, "view_invoices"));
}

#[test]
fn inactive_actor_is_denied() {
    let mut admin = actor(1, Role::Admin);
    admin.is_active = false;
    assert!(!has_permission(Some(&admin), "all"));
}

#[test]
fn unknown_role_code_is_denied() {
    let mut someone = actor(9, Role::Storekeeper);
    someone.role_code = "intern".to_string();
    assert!(!has_permission(Some(&someone), "view_invoices"));
    assert!(!has_permission(Some(&someone), "all"));
}

#[test]
fn require_permission_rejects_a_miss() {
    let storekeeper = actor(4, Role::Storekeeper);
    assert!(require_permission(&storekeeper, "view_invoices").is_ok());
    assert!(require_permission(&storekeeper, "view_reports").is_err());
}

#[test]
fn sales_officer_sees_only_own_invoices() {
    let sales = actor(10, Role::SalesOfficer);
    let other = actor(11, Role::SalesOfficer);
    let cust = customer(100, "ABC Construction Ltd", None);

    let invoices = vec![
        invoice(InvoiceFixture {
            id: 1,
            number: "INV-2026-000001",
            customer: &cust,
            created_by: sales.user_id,
            status: InvoiceStatus::Sent,
            total: "100",
            created: at(2026, 8, 1),
        }),
        invoice(InvoiceFixture {
            id: 2,
            number: "INV-2026-000002",
            customer: &cust,
            created_by: other.user_id,
            status: InvoiceStatus::Sent,
            total: "200",
            created: at(2026, 8, 2),
        }),
    ];

    let visible = visible_invoices(&sales, invoices);
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].invoice.created_by, sales.user_id);
}

#[test]
fn other_roles_see_the_full_collection_unchanged() {
    let sales = actor(10, Role::SalesOfficer);
    let cust = customer(100, "ABC Construction Ltd", None);
    let invoices: Vec<_> = (1..=3)
        .map(|n| {
            invoice(InvoiceFixture {
                id: n as u128,
                number: "INV-2026-000001",
                customer: &cust,
                created_by: sales.user_id,
                status: InvoiceStatus::Draft,
                total: "10",
                created: at(2026, 8, n),
            })
        })
        .collect();
    let ids: Vec<_> = invoices.iter().map(|i| i.invoice.invoice_id).collect();

    for role in [Role::Admin, Role::ManagingDirector, Role::Storekeeper] {
        let viewer = actor(20, role);
        let visible = visible_invoices(&viewer, invoices.clone());
        let visible_ids: Vec<_> = visible.iter().map(|i| i.invoice.invoice_id).collect();
        assert_eq!(visible_ids, ids);
    }
}

#[test]
fn edit_rights_are_admin_or_owning_sales_officer() {
    let admin = actor(1, Role::Admin);
    let director = actor(2, Role::ManagingDirector);
    let storekeeper = actor(4, Role::Storekeeper);
    let owner = actor(10, Role::SalesOfficer);
    let other_sales = actor(11, Role::SalesOfficer);
    let cust = customer(100, "XYZ Hardware Store", None);

    let owned = invoice(InvoiceFixture {
        id: 1,
        number: "INV-2026-000001",
        customer: &cust,
        created_by: owner.user_id,
        status: InvoiceStatus::Draft,
        total: "50",
        created: at(2026, 8, 1),
    });

    assert!(can_edit_invoice(&admin, &owned.invoice));
    assert!(can_edit_invoice(&owner, &owned.invoice));
    assert!(!can_edit_invoice(&other_sales, &owned.invoice));
    assert!(!can_edit_invoice(&director, &owned.invoice));
    assert!(!can_edit_invoice(&storekeeper, &owned.invoice));

    assert!(require_edit(&owner, &owned.invoice).is_ok());
    assert!(require_edit(&other_sales, &owned.invoice).is_err());
}
