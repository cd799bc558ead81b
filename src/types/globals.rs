//! The platform-provided globals table.
//!
//! Built once, lazily, with no I/O on the hot path -- matching the
//! `once_cell`/`lazy_static` globals idiom seen in `src/lexer/mod.rs`'s
//! `LEX_MAP`.

use std::collections::HashMap;

use once_cell::sync::OnceCell;

use super::{FunctionParam, Type};

static GLOBAL_VALUES: OnceCell<HashMap<String, Type>> = OnceCell::new();

/// Build the table once. This crate ships a small built-in set (`print`,
/// `nil`'s companions); a host embedding this engine for a real platform is
/// expected to extend it before the first call, which is out of scope here.
fn build() -> HashMap<String, Type> {
    let mut table = HashMap::new();
    table.insert(
        "print".to_string(),
        Type::Function {
            params: vec![FunctionParam { name: Some("value".to_string()), ty: Type::Unknown }],
            return_type: Box::new(Type::Nil),
        },
    );
    table
}

pub fn global_value_table() -> &'static HashMap<String, Type> {
    GLOBAL_VALUES.get_or_init(build)
}

pub fn lookup(name: &str) -> Option<Type> {
    global_value_table().get(name).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn print_is_a_known_global() {
        assert!(lookup("print").is_some());
        assert!(lookup("does_not_exist").is_none());
    }
}
