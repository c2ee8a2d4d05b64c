// ==========================================
// 客户侧转换: Client / Site / Subcontractor
// ==========================================

use super::{address, first_per_code, text, AddressColumns, STREET_ADDRESS};
use crate::domain::customer::{Client, Site, Subcontractor};
use crate::domain::types::{EntityKind, Table};
use crate::importer::context::LoadContext;
use crate::importer::field_normalizer::{
    normalize_boolean, normalize_date, normalize_enum_label, normalize_integer, normalize_number,
    normalize_time,
};
use crate::importer::label_maps::{CLIENT_STATUS, DEFAULT_STATUS, SITE_STATUS};
use crate::importer::sheet::SheetRow;
use uuid::Uuid;

const BILLING_ADDRESS: AddressColumns = AddressColumns {
    street: "Billing Address",
    suite: Some("Suite/Unit"),
    city: "Billing City",
    state: "Billing State",
    zip: "Billing Zip",
};

const VENDOR_ADDRESS: AddressColumns = AddressColumns {
    street: "Street Address",
    suite: None,
    city: "City",
    state: "State",
    zip: "ZIP Code",
};

pub fn transform_clients(rows: &[SheetRow], ctx: &mut LoadContext) -> Vec<Client> {
    let table = Table::Clients;
    let rows = first_per_code(rows, table, ctx, |row| text(row, "Client Code"));
    let mut out = Vec::with_capacity(rows.len());

    for row in rows {
        let (Some(code), Some(name)) = (text(row, "Client Code"), text(row, "Client Name")) else {
            ctx.missing_identifier(table, row.row_number, "Client Code/Client Name");
            continue;
        };

        let id = Uuid::new_v4();
        ctx.identities.register(EntityKind::Client, &code, id);

        out.push(Client {
            id,
            tenant_id: ctx.tenant_id,
            client_code: code,
            name,
            status: normalize_enum_label(
                text(row, "Client Status").as_deref(),
                CLIENT_STATUS,
                DEFAULT_STATUS,
            ),
            billing_address: address(row, &BILLING_ADDRESS),
            client_since: normalize_date(row.get("Client Since")),
            client_type: text(row, "Client Type"),
            industry: text(row, "Industry"),
            bill_to_name: text(row, "Bill To Name"),
            payment_terms: text(row, "Payment Terms"),
            po_required: normalize_boolean(row.get("PO Required"), false),
            insurance_required: normalize_boolean(row.get("Insurance Required"), false),
            insurance_expiry: normalize_date(row.get("Insurance Expiry Date")),
            credit_limit: normalize_number(row.get("Credit Limit"), None),
            website: text(row, "Website"),
            tax_id: text(row, "Tax ID"),
            contract_start_date: normalize_date(row.get("Contract Start Date")),
            contract_end_date: normalize_date(row.get("Contract End Date")),
            auto_renewal: normalize_boolean(row.get("Auto Renewal"), false),
            invoice_frequency: text(row, "Invoice Frequency"),
            notes: text(row, "Notes"),
        });
    }

    out
}

/// 站点: 客户为必需引用，主管为可选引用
pub fn transform_sites(rows: &[SheetRow], ctx: &mut LoadContext) -> Vec<Site> {
    let table = Table::Sites;
    let rows = first_per_code(rows, table, ctx, |row| text(row, "Site Code"));
    let mut out = Vec::with_capacity(rows.len());

    for row in rows {
        let (Some(code), Some(name)) = (text(row, "Site Code"), text(row, "Site Name")) else {
            ctx.missing_identifier(table, row.row_number, "Site Code/Site Name");
            continue;
        };

        let Some(client_code) = text(row, "Client Code") else {
            ctx.missing_identifier(table, row.row_number, "Client Code");
            continue;
        };
        let Some(client_id) =
            ctx.resolve_required(table, row.row_number, EntityKind::Client, &client_code)
        else {
            continue;
        };

        let supervisor_id = ctx.resolve_optional(
            table,
            row.row_number,
            EntityKind::Staff,
            text(row, "Supervisor Code").as_deref(),
        );

        let id = Uuid::new_v4();
        ctx.identities.register(EntityKind::Site, &code, id);

        let entry_instructions = text(row, "Entry Instructions");
        out.push(Site {
            id,
            tenant_id: ctx.tenant_id,
            client_id,
            site_code: code,
            name,
            status: normalize_enum_label(
                text(row, "Site Status").as_deref(),
                SITE_STATUS,
                DEFAULT_STATUS,
            ),
            status_date: normalize_date(row.get("Status Date")),
            status_reason: text(row, "Status Reason"),
            service_start_date: normalize_date(row.get("Service Start Date")),
            address: address(row, &STREET_ADDRESS).unwrap_or_default(),
            alarm_code: text(row, "Alarm Code"),
            alarm_system: text(row, "Alarm System"),
            alarm_company: text(row, "Alarm Company"),
            security_protocol: text(row, "Security Protocol"),
            access_notes: entry_instructions.clone(),
            entry_instructions,
            parking_instructions: text(row, "Parking Instructions"),
            square_footage: normalize_number(row.get("Total Cleanable SqFt"), None),
            number_of_floors: normalize_integer(row.get("Number Of Floors"), None),
            employees_on_site: normalize_integer(row.get("Employees On Site"), None),
            earliest_start_time: normalize_time(row.get("Earliest Start Time")),
            latest_start_time: normalize_time(row.get("Latest Start Time")),
            business_hours_start: normalize_time(row.get("Business Hours Start")),
            business_hours_end: normalize_time(row.get("Business Hours End")),
            weekend_access: normalize_boolean(row.get("Weekend Access"), false),
            janitorial_closet_location: text(row, "Janitorial Closet Location"),
            supply_storage_location: text(row, "Supply Storage Location"),
            water_source_location: text(row, "Water Source Location"),
            dumpster_location: text(row, "Dumpster Location"),
            supervisor_id,
            risk_level: text(row, "Risk Level"),
            priority_level: text(row, "Priority Level"),
            osha_compliance_required: normalize_boolean(row.get("OSHA Compliance Required"), false),
            background_check_required: normalize_boolean(
                row.get("Background Check Required"),
                false,
            ),
            last_inspection_date: normalize_date(row.get("Last Inspection Date")),
            next_inspection_date: normalize_date(row.get("Next Inspection Date")),
            notes: text(row, "Notes"),
        });
    }

    out
}

pub fn transform_subcontractors(rows: &[SheetRow], ctx: &mut LoadContext) -> Vec<Subcontractor> {
    let table = Table::Subcontractors;
    let rows = first_per_code(rows, table, ctx, |row| text(row, "Subcontractor Code"));
    let mut out = Vec::with_capacity(rows.len());

    for row in rows {
        let (Some(code), Some(name)) = (
            text(row, "Subcontractor Code"),
            text(row, "Subcontractor Name"),
        ) else {
            ctx.missing_identifier(table, row.row_number, "Subcontractor Code/Subcontractor Name");
            continue;
        };

        let id = Uuid::new_v4();
        ctx.identities.register(EntityKind::Subcontractor, &code, id);

        let business_phone = text(row, "Business Phone");
        out.push(Subcontractor {
            id,
            tenant_id: ctx.tenant_id,
            subcontractor_code: code,
            company_name: name,
            contact_name: text(row, "Contact Name"),
            contact_title: text(row, "Contact Title"),
            email: text(row, "Email"),
            phone: business_phone.clone(),
            business_phone,
            mobile_phone: text(row, "Mobile Phone"),
            website: text(row, "Website"),
            address: address(row, &VENDOR_ADDRESS),
            status: DEFAULT_STATUS.to_string(),
            services_provided: text(row, "Services Provided"),
            license_number: text(row, "License Number"),
            license_expiry: normalize_date(row.get("License Expiry")),
            insurance_company: text(row, "Insurance Company"),
            insurance_policy_number: text(row, "Insurance Policy Number"),
            insurance_expiry: normalize_date(row.get("Insurance Expiry")),
            hourly_rate: normalize_number(row.get("Hourly Rate"), None),
            payment_terms: text(row, "Payment Terms"),
            tax_id: text(row, "Tax ID"),
            w9_on_file: normalize_boolean(row.get("W9 On File"), false),
            notes: text(row, "Notes"),
        });
    }

    out
}
