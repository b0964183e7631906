pub mod legal_districts;
