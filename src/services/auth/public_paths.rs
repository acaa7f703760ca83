/// Ordered set of path prefixes that bypass the authentication gate.
///
/// A prefix matches the path itself and anything below it on a segment
/// boundary: `/api/v1/auth/login` matches `/api/v1/auth/login` and
/// `/api/v1/auth/login/`, but not `/api/v1/auth/login-as-admin`.
#[derive(Debug, Clone, Default)]
pub struct PublicPaths {
    prefixes: Vec<String>,
}

impl PublicPaths {
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let prefixes = prefixes
            .into_iter()
            .map(Into::into)
            .map(|p| {
                let trimmed = p.trim();
                if trimmed.len() > 1 {
                    trimmed.trim_end_matches('/').to_string()
                } else {
                    trimmed.to_string()
                }
            })
            .filter(|p| !p.is_empty())
            .collect();
        Self { prefixes }
    }

    #[cfg(test)]
    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }

    pub fn is_public(&self, path: &str) -> bool {
        self.prefixes.iter().any(|prefix| {
            if prefix == "/" {
                return true;
            }
            match path.strip_prefix(prefix.as_str()) {
                Some(rest) => rest.is_empty() || rest.starts_with('/'),
                None => false,
            }
        })
    }
}
