//! SQL statement builders.
//!
//! Pure string builders given a table name and column list; no execution
//! happens here. Statements use `?` positional placeholders for every bound
//! value, the id predicate included. Set-list values are parameter-bound
//! rather than rendered as quoted literals; injection through entity field
//! contents is not expressible.

/// Build a SELECT-by-id statement with one bound parameter (the id).
pub fn select_by_id(table: &str) -> String {
    format!("select * from {table} where id = ?")
}

/// Build an UPDATE statement setting every given column, keyed by id.
///
/// Produces `update <table> set c1 = ?, c2 = ?, ... where id = ?`; the caller
/// binds the column values in the given order followed by the id.
pub fn update_by_id(table: &str, columns: &[&str]) -> String {
    let set_list = columns
        .iter()
        .map(|c| format!("{c} = ?"))
        .collect::<Vec<_>>()
        .join(", ");
    format!("update {table} set {set_list} where id = ?")
}
