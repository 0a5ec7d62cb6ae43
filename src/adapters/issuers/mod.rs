pub mod age_issuer;
