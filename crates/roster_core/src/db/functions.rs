//! Application-defined SQL functions.
//!
//! # Invariants
//! - `roster_fold(text)` lowercases with the same Unicode mapping as
//!   `str::to_lowercase`, so SQL search matches in-memory filtering.
//! - `roster_fold(NULL)` is `NULL`.

use super::DbResult;
use rusqlite::functions::FunctionFlags;
use rusqlite::Connection;

/// Registers roster SQL functions on `conn`.
///
/// Re-registering replaces the previous definition, so this is safe to call
/// more than once per connection.
pub fn register_functions(conn: &Connection) -> DbResult<()> {
    conn.create_scalar_function(
        "roster_fold",
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let text = ctx.get::<Option<String>>(0)?;
            Ok(text.map(|value| value.to_lowercase()))
        },
    )?;
    Ok(())
}
