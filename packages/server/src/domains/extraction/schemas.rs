//! Extraction schemas, one per document type.
//!
//! These are sent verbatim as the provider's `data_schema`, so they are
//! plain JSON Schema values rather than Rust types.

use serde_json::{json, Map, Value};

use crate::domains::documents::DocumentType;

pub fn schema_for(document_type: DocumentType) -> Value {
    match document_type {
        DocumentType::GovernmentId => government_id_schema(),
        DocumentType::Invoice => invoice_schema(),
    }
}

fn field(kind: &str, description: &str) -> Value {
    json!({ "type": kind, "description": description })
}

fn nullable(kind: &str, description: &str) -> Value {
    json!({ "type": [kind, "null"], "description": description })
}

fn object(required: &[&str], properties: Vec<(&str, Value)>) -> Value {
    let properties: Map<String, Value> = properties
        .into_iter()
        .map(|(name, schema)| (name.to_string(), schema))
        .collect();

    let mut schema = json!({ "type": "object", "properties": properties });
    if !required.is_empty() {
        schema["required"] = json!(required);
    }
    schema
}

fn closed(mut schema: Value) -> Value {
    schema["additionalProperties"] = Value::Bool(false);
    schema
}

pub fn government_id_schema() -> Value {
    closed(object(
        &[
            "full_name",
            "id_number",
            "date_of_birth",
            "gender",
            "address",
            "issue_date",
            "nationality",
            "document_type",
        ],
        vec![
            ("full_name", field("string", "Full name as it appears on the document")),
            ("id_number", field("string", "Unique identification number")),
            ("date_of_birth", field("string", "Date of birth in YYYY-MM-DD format")),
            ("gender", field("string", "Gender (Male/Female/Other)")),
            ("address", field("string", "Full address as shown on the document")),
            ("issue_date", field("string", "Date of issue in YYYY-MM-DD format")),
            (
                "expiry_date",
                nullable("string", "Expiry date in YYYY-MM-DD format if applicable"),
            ),
            ("nationality", field("string", "Nationality of the document holder")),
            (
                "document_type",
                field(
                    "string",
                    "Type of government ID (e.g., Aadhaar, Passport, Driver's License)",
                ),
            ),
        ],
    ))
}

/// Retail invoice in the Indian GST layout.
pub fn invoice_schema() -> Value {
    let seller_info = object(
        &["name", "gstin"],
        vec![
            ("name", field("string", "Seller business name")),
            ("gstin", field("string", "Seller GST Identification Number")),
            (
                "contact_numbers",
                json!({
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Seller contact phone numbers"
                }),
            ),
        ],
    );

    let customer_info = object(
        &["name"],
        vec![
            ("name", field("string", "Customer name")),
            ("address", nullable("string", "Customer address")),
            ("contact", nullable("string", "Customer contact number")),
            ("gstin", nullable("string", "Customer GST Identification Number")),
        ],
    );

    let invoice_details = object(
        &["date", "bill_no"],
        vec![
            ("date", field("string", "Invoice date in YYYY-MM-DD format")),
            ("bill_no", field("string", "Invoice/Bill number")),
            (
                "gold_price_per_unit",
                nullable("number", "Gold price per unit (for jewelry invoices)"),
            ),
        ],
    );

    let line_item = object(
        &["description", "weight", "rate", "amount"],
        vec![
            ("description", field("string", "Item description")),
            ("hsn_code", nullable("string", "HSN code for the item")),
            ("weight", field("number", "Item weight in grams")),
            (
                "wastage_allowance_percentage",
                nullable("number", "Wastage allowance percentage"),
            ),
            ("rate", field("number", "Rate per unit")),
            (
                "making_charges_percentage",
                nullable("number", "Making charges as percentage"),
            ),
            ("amount", field("number", "Line item total")),
        ],
    );

    let summary = object(
        &["sub_total", "taxable_amount", "grand_total"],
        vec![
            ("sub_total", field("number", "Subtotal amount")),
            ("discount", nullable("number", "Discount amount")),
            ("taxable_amount", field("number", "Taxable amount")),
            ("sgst_percentage", nullable("number", "SGST percentage")),
            ("sgst_amount", nullable("number", "SGST amount")),
            ("cgst_percentage", nullable("number", "CGST percentage")),
            ("cgst_amount", nullable("number", "CGST amount")),
            ("grand_total", field("number", "Grand total amount")),
        ],
    );

    let payment_details = object(
        &[],
        vec![
            ("cash", field("number", "Cash payment amount")),
            ("upi", field("number", "UPI payment amount")),
            ("card", field("number", "Card payment amount")),
        ],
    );

    closed(object(
        &[
            "seller_info",
            "customer_info",
            "invoice_details",
            "line_items",
            "summary",
            "payment_details",
        ],
        vec![
            ("seller_info", seller_info),
            ("customer_info", customer_info),
            ("invoice_details", invoice_details),
            ("line_items", json!({ "type": "array", "items": line_item })),
            ("summary", summary),
            ("payment_details", payment_details),
            (
                "total_amount_in_words",
                nullable("string", "Total amount in words"),
            ),
        ],
    ))
}
