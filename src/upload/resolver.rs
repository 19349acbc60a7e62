//! Test case resolution.
//!
//! Maps canonical test titles onto the project's existing test cases. A case
//! matches when its title equals or contains the test title, which tolerates
//! runner decorations such as `[chromium] › Login works`. The first match in
//! list order wins.
//!
//! The project's case list is fetched once, at the first lookup, and treated
//! as a snapshot for the rest of the pass. Cases created through the resolver
//! are appended to the snapshot so that later tests with the same title reuse
//! them instead of creating duplicates.

use std::path::Path;

use tracing::debug;

use crate::client::{
    ApiResult, CaseStatus, CreateTestCaseRequest, Priority, TestCase, TestManagementApi,
};

/// How a test case was obtained.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// An existing case matched the title.
    Existing(TestCase),
    /// No case matched and a new one was created.
    Created(TestCase),
}

impl Resolution {
    /// The resolved test case.
    pub fn test_case(&self) -> &TestCase {
        match self {
            Resolution::Existing(case) | Resolution::Created(case) => case,
        }
    }
}

/// Returns `true` if a case titled `case_title` matches a test titled `test_title`.
pub fn matches_title(case_title: &str, test_title: &str) -> bool {
    case_title == test_title || case_title.contains(test_title)
}

/// Tag derived from a suite file: its base name with the last extension removed.
pub fn file_tag(source_file: &str) -> String {
    Path::new(source_file)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| source_file.to_string())
}

/// Request used to create a case for a test that has none.
pub fn new_test_case_request(title: &str, source_file: &str) -> CreateTestCaseRequest {
    CreateTestCaseRequest {
        title: title.to_string(),
        description: Some(format!("Test from file: {}", source_file)),
        priority: Some(Priority::Medium),
        status: Some(CaseStatus::Active),
        tags: Some(vec![file_tag(source_file)]),
    }
}

/// Resolves test titles to test cases within one project for one upload pass.
pub struct TestCaseResolver<'a, A: ?Sized> {
    api: &'a A,
    project_id: u64,
    snapshot: Option<Vec<TestCase>>,
}

impl<'a, A: TestManagementApi + ?Sized> TestCaseResolver<'a, A> {
    /// Creates a resolver; no request is made until the first lookup.
    pub fn new(api: &'a A, project_id: u64) -> Self {
        Self {
            api,
            project_id,
            snapshot: None,
        }
    }

    async fn snapshot(&mut self) -> ApiResult<&mut Vec<TestCase>> {
        if self.snapshot.is_none() {
            let page = self.api.list_test_cases(self.project_id).await?;
            debug!(
                "Loaded {} test cases for project {}",
                page.data.len(),
                self.project_id
            );
            self.snapshot = Some(page.data);
        }

        Ok(self.snapshot.get_or_insert_with(Vec::new))
    }

    /// Finds the first case whose title matches `title`.
    pub async fn find(&mut self, title: &str) -> ApiResult<Option<TestCase>> {
        let cases = self.snapshot().await?;
        Ok(cases
            .iter()
            .find(|case| matches_title(&case.title, title))
            .cloned())
    }

    /// Finds a matching case, creating one from `source_file` when none exists.
    pub async fn find_or_create(&mut self, title: &str, source_file: &str) -> ApiResult<Resolution> {
        if let Some(existing) = self.find(title).await? {
            debug!("Matched \"{}\" to test case {}", title, existing.id);
            return Ok(Resolution::Existing(existing));
        }

        let request = new_test_case_request(title, source_file);
        let created = self.api.create_test_case(self.project_id, &request).await?;
        debug!("Created test case {} for \"{}\"", created.id, title);

        self.snapshot().await?.push(created.clone());
        Ok(Resolution::Created(created))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_exact_and_substring() {
        assert!(matches_title("Login works", "Login works"));
        assert!(matches_title("[chromium] › Login works", "Login works"));
        assert!(!matches_title("Login", "Login works"));
        assert!(!matches_title("login works", "Login works"));
    }

    #[test]
    fn test_file_tag_strips_last_extension() {
        assert_eq!(file_tag("tests/login.spec.ts"), "login.spec");
        assert_eq!(file_tag("cart.ts"), "cart");
        assert_eq!(file_tag("e2e/checkout"), "checkout");
        assert_eq!(file_tag("unknown"), "unknown");
    }

    #[test]
    fn test_new_test_case_request() {
        let request = new_test_case_request("Login works", "tests/login.spec.ts");
        assert_eq!(request.title, "Login works");
        assert_eq!(
            request.description.as_deref(),
            Some("Test from file: tests/login.spec.ts")
        );
        assert_eq!(request.priority, Some(Priority::Medium));
        assert_eq!(request.status, Some(CaseStatus::Active));
        assert_eq!(request.tags, Some(vec!["login.spec".to_string()]));
    }
}
