use url::Url;

/// Represents a GitHub repository with owner and name components.
///
/// Every protection request targets one repository; the owner and name are
/// kept apart because the REST endpoint takes them as separate path segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    pub owner: String,
    pub name: String,
}

impl Repository {
    /// Creates a new Repository instance.
    ///
    /// # Arguments
    ///
    /// * `owner` - The repository owner (username or organization)
    /// * `name` - The repository name
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Returns the repository in "owner/repo" format.
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }

    /// Parses a "owner/repo" string into a Repository.
    ///
    /// Returns `None` when either component is empty or the name itself
    /// contains another `/`.
    pub fn parse(full_name: &str) -> Option<Self> {
        let parts: Vec<&str> = full_name.splitn(2, '/').collect();
        if parts.len() == 2
            && !parts[0].is_empty()
            && !parts[1].is_empty()
            && !parts[1].contains('/')
        {
            Some(Self::new(parts[0], parts[1]))
        } else {
            None
        }
    }

    /// Returns the owner component.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Returns the name component.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Builds the target for one branch of this repository.
    pub fn branch(&self, branch: impl Into<String>) -> TargetRef {
        TargetRef {
            repository: self.clone(),
            branch: branch.into(),
        }
    }
}

impl std::fmt::Display for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.full_name())
    }
}

/// A single branch of a repository: the unit a protection policy is applied to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetRef {
    pub repository: Repository,
    pub branch: String,
}

impl TargetRef {
    /// REST path of the branch protection resource, relative to the API root.
    ///
    /// Each segment is percent-encoded, so `#`, `%`, `?` and `/` in a branch
    /// name stay inside the branch segment.
    pub fn protection_path(&self) -> String {
        let mut url = Url::parse("http://localhost/").expect("Failed to parse base URL");
        url.path_segments_mut()
            .expect("http URLs have path segments")
            .pop_if_empty()
            .extend([
                "repos",
                self.repository.owner(),
                self.repository.name(),
                "branches",
                &self.branch,
                "protection",
            ]);
        url.path().to_string()
    }
}

impl std::fmt::Display for TargetRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.repository, self.branch)
    }
}
