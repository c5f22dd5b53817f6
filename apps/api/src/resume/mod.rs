// Résumé storage: one résumé string kept on local disk, plus its HTTP handlers.

pub mod handlers;
pub mod store;
