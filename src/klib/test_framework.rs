//! Framework de testes do kernel
//!
//! Suites que rodam dentro do próprio kernel (feature `self_test`), sem o
//! harness do cargo: cada caso é uma função que devolve `TestResult`.
//!
//! No kernel um pânico dentro de um caso é fatal (`panic = "abort"`); o nome
//! do caso em execução fica em `running_case` para o panic handler. No host o
//! pânico é capturado e o caso conta como falho.

use spin::Mutex;

/// Caso em execução
static RUNNING_CASE: Mutex<Option<&'static str>> = Mutex::new(None);

/// Resultado de teste
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestResult {
    Passed,
    Failed,
    Skipped,
}

/// Um caso de teste
pub struct TestCase {
    pub name: &'static str,
    pub func: fn() -> TestResult,
}

impl TestCase {
    pub const fn new(name: &'static str, func: fn() -> TestResult) -> Self {
        Self { name, func }
    }
}

/// Totais de uma suite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SuiteReport {
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl SuiteReport {
    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }
}

/// Nome do caso em execução, se houver. Nunca bloqueia.
pub fn running_case() -> Option<&'static str> {
    RUNNING_CASE.try_lock().and_then(|case| *case)
}

#[cfg(not(test))]
fn run_case(test: &TestCase) -> TestResult {
    (test.func)()
}

#[cfg(test)]
fn run_case(test: &TestCase) -> TestResult {
    std::panic::catch_unwind(test.func).unwrap_or(TestResult::Failed)
}

/// Executa a suite e devolve os totais.
pub fn run_test_suite(name: &str, tests: &[TestCase]) -> SuiteReport {
    crate::kinfo!("=== Suite ===");
    crate::kinfo!(name);

    let mut report = SuiteReport::default();

    for test in tests {
        *RUNNING_CASE.lock() = Some(test.name);
        let result = run_case(test);
        *RUNNING_CASE.lock() = None;

        match result {
            TestResult::Passed => {
                crate::kok!(test.name);
                report.passed += 1;
            }
            TestResult::Failed => {
                crate::kfail!(test.name);
                report.failed += 1;
            }
            TestResult::Skipped => {
                crate::kwarn!(test.name);
                report.skipped += 1;
            }
        }
    }

    crate::kinfo!("Resultados: passed=", report.passed);
    if !report.all_passed() {
        crate::kerror!("Resultados: failed=", report.failed);
    }
    report
}
