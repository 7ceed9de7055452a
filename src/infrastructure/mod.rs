//! Infrastructure 層 — ドメイン層が定義する trait の具体的な実装

pub mod store;
