#![forbid(unsafe_code)]

mod attachments;
mod core;
mod forms;
mod indexes;

pub(super) fn full_schema_sql() -> String {
    let mut sql = String::new();
    sql.push_str(core::SQL);
    sql.push_str(forms::SQL);
    sql.push_str(attachments::SQL);
    sql.push_str(indexes::SQL);
    sql
}
