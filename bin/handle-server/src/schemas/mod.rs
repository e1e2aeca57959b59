//! HTTP request / response types, kept separate from the vendor wire types.

pub mod api;
