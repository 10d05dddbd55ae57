//! Command line front end for the `ead_sarc` and `ead_yaz0` libraries.

pub mod commands;
