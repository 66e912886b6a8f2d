//! Suporte a testes do scheduler
//!
//! `fixture` tem os colaboradores falsos usados pelos testes de unidade;
//! `test` é a suite que a idle roda dentro do kernel com a feature
//! `self_test`.


pub use test::run_sched_tests;
