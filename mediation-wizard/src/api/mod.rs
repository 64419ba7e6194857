pub mod mediation;
