use std::collections::{BTreeSet, HashSet};

use crate::types::Statement;

/// Index of a test within its [`ExecutionSpectrum`]. Two tests can record
/// identical outcomes and coverage yet still be distinct executions, so tests
/// are identified by their position rather than by value.
pub type TestId = usize;

/// One recorded test execution: whether it passed and the set of statements
/// it touched.
#[derive(Debug, Clone)]
pub struct TestCase {
    passed: bool,
    statements_executed: HashSet<Statement>,
}

impl TestCase {
    pub fn new(passed: bool, statements_executed: impl IntoIterator<Item = Statement>) -> Self {
        Self {
            passed,
            statements_executed: statements_executed.into_iter().collect(),
        }
    }

    pub fn passed(&self) -> bool {
        self.passed
    }

    pub fn covers(&self, statement: &Statement) -> bool {
        self.statements_executed.contains(statement)
    }

    pub fn statements_executed(&self) -> &HashSet<Statement> {
        &self.statements_executed
    }
}

/// Everything recorded about the test suite of one analyzed revision: the
/// deduplicated set of statements seen anywhere, and the full ordered list of
/// test executions.
///
/// Invariant: every statement covered by any test is also in the statement
/// set. `add_test` maintains this by unioning each new test's coverage in, so
/// the set can only grow; nothing is ever removed.
#[derive(Debug, Default)]
pub struct ExecutionSpectrum {
    statements: BTreeSet<Statement>,
    tests: Vec<TestCase>,
}

impl ExecutionSpectrum {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a statement that may not have been covered by any test. Already
    /// known statements are ignored.
    pub fn add_statement(&mut self, statement: Statement) {
        self.statements.insert(statement);
    }

    pub fn add_statements(&mut self, statements: impl IntoIterator<Item = Statement>) {
        self.statements.extend(statements);
    }

    /// Appends a test, unioning its covered statements into the statement
    /// set, and returns the id assigned to it.
    pub fn add_test(&mut self, test: TestCase) -> TestId {
        self.statements
            .extend(test.statements_executed.iter().cloned());
        self.tests.push(test);
        self.tests.len() - 1
    }

    pub fn add_tests(&mut self, tests: impl IntoIterator<Item = TestCase>) {
        for test in tests {
            self.add_test(test);
        }
    }

    /// All known statements, in a stable (file, line) order.
    pub fn statements(&self) -> impl Iterator<Item = &Statement> {
        self.statements.iter()
    }

    pub fn statement_count(&self) -> usize {
        self.statements.len()
    }

    pub fn contains_statement(&self, statement: &Statement) -> bool {
        self.statements.contains(statement)
    }

    pub fn tests(&self) -> &[TestCase] {
        &self.tests
    }

    /// Ids of all tests with the given outcome, in recorded order.
    pub fn test_ids(&self, passed: bool) -> Vec<TestId> {
        self.tests
            .iter()
            .enumerate()
            .filter(|(_, test)| test.passed == passed)
            .map(|(id, _)| id)
            .collect()
    }

    /// Ids of all tests that executed the given statement.
    pub fn tests_covering(&self, statement: &Statement) -> Vec<TestId> {
        self.tests
            .iter()
            .enumerate()
            .filter(|(_, test)| test.covers(statement))
            .map(|(id, _)| id)
            .collect()
    }

    /// Ids of all tests that executed the given statement and had the given
    /// outcome.
    pub fn tests_covering_with_outcome(&self, statement: &Statement, passed: bool) -> Vec<TestId> {
        self.tests
            .iter()
            .enumerate()
            .filter(|(_, test)| test.passed == passed && test.covers(statement))
            .map(|(id, _)| id)
            .collect()
    }
}
