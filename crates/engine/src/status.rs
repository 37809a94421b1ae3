//! Server status document assembly
//!
//! Status callers get one structured document per query. The
//! `transactions` section carries exactly the four lifecycle counters,
//! camelCase, always present; absence of any of them is a contract
//! violation for consumers, so the section is built from a
//! [`CountersSnapshot`](petrel_txn::CountersSnapshot) whose serialization
//! fixes the field set.

use crate::database::Database;
use serde_json::{json, Value};

/// Build the status document for a database
///
/// Pure read; safe to call at any time, including concurrently with
/// in-flight transitions.
pub fn server_status(db: &Database) -> Value {
    let transactions = db.counters().snapshot();
    json!({
        "ok": 1,
        "sessions": {
            "registered": db.registry().len(),
        },
        "transactions": transactions,
    })
}
