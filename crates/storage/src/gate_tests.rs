// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

fn rejection(sql: &str) -> String {
    match check_read_only(sql) {
        Err(StorageError::QueryNotAllowed(msg)) => msg,
        other => panic!("expected QueryNotAllowed, got {:?}", other),
    }
}

#[parameterized(
    plain_select = { "SELECT * FROM sessions" },
    lowercase = { "select id from sessions" },
    with_cte = { "WITH recent AS (SELECT * FROM sessions) SELECT * FROM recent" },
    leading_whitespace = { "   SELECT 1" },
    select_substring_ok = { "SELECT * FROM tools WHERE tool_name = 'x'" },
)]
fn allows_read_queries(sql: &str) {
    assert!(check_read_only(sql).is_ok());
}

#[parameterized(
    insert = { "INSERT INTO sessions VALUES ('x')", "INSERT" },
    update = { "UPDATE sessions SET title = 'x'", "UPDATE" },
    delete = { "DELETE FROM sessions", "DELETE" },
    drop = { "DROP TABLE sessions", "DROP" },
    create = { "CREATE TABLE t (id)", "CREATE" },
    alter = { "ALTER TABLE sessions ADD COLUMN x", "ALTER" },
    pragma = { "PRAGMA user_version = 2", "PRAGMA" },
    vacuum = { "VACUUM", "VACUUM" },
    lowercase_delete = { "delete from sessions", "DELETE" },
)]
fn blocks_leading_write_keyword(sql: &str, keyword: &str) {
    assert_eq!(rejection(sql), format!("{} statements are blocked", keyword));
}

#[parameterized(
    trailing_delete = { "SELECT 1; DELETE FROM sessions", "DELETE" },
    embedded_attach = { "WITH x AS (SELECT 1) ATTACH DATABASE 'e' AS e", "ATTACH" },
    embedded_begin = { "SELECT 1 ; BEGIN ; SELECT 2", "BEGIN" },
)]
fn blocks_embedded_write_token(sql: &str, keyword: &str) {
    assert_eq!(rejection(sql), format!("{} statements are blocked", keyword));
}

#[parameterized(
    explain = { "EXPLAIN SELECT 1" },
    empty = { "" },
    whitespace_only = { "   " },
    garbage = { "HELLO WORLD" },
)]
fn non_select_statements_get_generic_message(sql: &str) {
    assert_eq!(rejection(sql), "only SELECT/WITH queries are allowed");
}

#[test]
fn keyword_inside_identifier_is_allowed() {
    // "updated_at" contains UPDATE as a substring but not as a token
    assert!(check_read_only("SELECT updated_at FROM sessions").is_ok());
}
