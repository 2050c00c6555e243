//! Single-operator credential check
//!
//! The desk has exactly one operator account. Only a sha256 digest of the
//! password is kept, in memory and on disk.

#[derive(Debug, Clone, PartialEq, Eq, minicbor::Encode, minicbor::Decode)]
pub struct Credentials {
    #[n(0)]
    username: String,
    #[n(1)]
    password_digest: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: &str) -> Self {
        Self {
            username: username.into(),
            password_digest: sha256::digest(password),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn verify(&self, username: &str, password: &str) -> bool {
        self.username == username && self.password_digest == sha256::digest(password)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_accepts_only_the_exact_pair() {
        let creds = Credentials::new("librarian", "hunter2");

        assert!(creds.verify("librarian", "hunter2"));
        assert!(!creds.verify("librarian", "hunter3"));
        assert!(!creds.verify("admin", "hunter2"));
    }

    #[test]
    fn password_is_not_stored_in_clear() {
        let creds = Credentials::new("librarian", "hunter2");
        let encoding = minicbor::to_vec(&creds).unwrap();

        let text = String::from_utf8_lossy(&encoding);
        assert!(!text.contains("hunter2"));

        let decoded: Credentials = minicbor::decode(&encoding).unwrap();
        assert!(decoded.verify("librarian", "hunter2"));
    }
}
