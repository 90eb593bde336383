//! Search - the query AST, its fluent builder and the compiler turning it
//! into relational predicates, sort and pagination

pub mod ast;
pub mod builder;
pub mod compiler;
pub mod validate;

pub use ast::{
    DatesAfterOptions, DatesAfterQuery, DatesBeforeOptions, DatesBeforeQuery, EqualitySymbol, Leaf,
    OrmSearch, PropertyOptions, PropertyQuery, SortOrder, SortStatement, Token,
};
pub use builder::SearchBuilder;
pub use compiler::compile_search;
pub use validate::validate_search;
