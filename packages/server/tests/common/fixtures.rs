//! Request bodies and payloads shared across tests.

#![allow(dead_code)]

use base64::Engine;
use serde_json::{json, Value};

pub fn invoice_data(bill_no: &str) -> Value {
    json!({
        "seller_info": { "name": "Shree Jewellers", "gstin": "27ABCDE1234F1Z5" },
        "customer_info": { "name": "Asha Rao" },
        "invoice_details": { "date": "2024-03-18", "bill_no": bill_no },
        "line_items": [
            { "description": "Gold ring", "weight": 4.2, "rate": 6150.0, "amount": 25830.0 }
        ],
        "summary": { "sub_total": 25830.0, "taxable_amount": 25830.0, "grand_total": 26604.9 },
        "payment_details": { "upi": 26604.9 }
    })
}

pub fn government_id_data(full_name: &str) -> Value {
    json!({
        "full_name": full_name,
        "id_number": "1234 5678 9012",
        "date_of_birth": "1990-01-31",
        "gender": "Female",
        "address": "12 MG Road, Pune",
        "issue_date": "2015-06-01",
        "expiry_date": null,
        "nationality": "Indian",
        "document_type": "Aadhaar"
    })
}

/// Body for POST /api/v1/documents
pub fn create_body(document_type: &str, file_name: &str, extracted_data: Value) -> Value {
    json!({
        "document_type": document_type,
        "file_name": file_name,
        "extracted_data": extracted_data,
    })
}

/// Body for POST /api/v1/extract
pub fn extract_body(document_type: &str, file_name: &str, content: &[u8]) -> Value {
    json!({
        "file_data": base64::engine::general_purpose::STANDARD.encode(content),
        "file_name": file_name,
        "document_type": document_type,
    })
}
