// Adapters
// データベース方言ごとの差異（識別子・型・SQL構文・接続）を吸収する層

pub mod database;
pub mod database_introspector;
pub mod drivers;
pub mod sql_generator;
pub mod sql_quote;
pub mod sqlite_ddl_parser;
pub mod type_mapping;
