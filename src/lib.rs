pub mod config;
pub mod error;
pub mod import;
pub mod ordering;
pub mod models {
    pub mod container;
    pub mod notes;
    pub mod paper;
    pub mod question;
}
pub mod parser {
    pub mod builder;
    pub mod tokens;
}
pub mod db {
    pub mod repository;
}
pub mod storage {
    pub mod client;
}
