use serde::{Deserialize, Serialize};

/// A student record as served by `/api/students`. The same shape is the
/// subject of an authenticated session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: i64,
    #[serde(rename = "firstName")]
    pub first_name: String,
    #[serde(rename = "lastName")]
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub major: String,
    #[serde(default)]
    pub year: i32,
}

impl Student {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Major for display; empty majors show as a dash
    pub fn major_display(&self) -> &str {
        if self.major.is_empty() {
            "-"
        } else {
            &self.major
        }
    }
}

/// Response body from `POST /auth/login`.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    #[serde(rename = "accessToken")]
    pub access_token: String,
    #[serde(rename = "refreshToken")]
    pub refresh_token: String,
    pub student: Student,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_student() {
        let json = r#"{"id":1,"firstName":"Ada","lastName":"Lovelace","email":"ada@example.edu","major":"Mathematics","year":3}"#;
        let student: Student = serde_json::from_str(json).expect("Failed to parse student JSON");
        assert_eq!(student.id, 1);
        assert_eq!(student.full_name(), "Ada Lovelace");
        assert_eq!(student.major_display(), "Mathematics");
    }

    #[test]
    fn test_parse_student_without_major() {
        // Major and year are optional columns server-side
        let json = r#"{"id":7,"firstName":"Grace","lastName":"Hopper","email":"grace@example.edu"}"#;
        let student: Student = serde_json::from_str(json).expect("Failed to parse student JSON");
        assert_eq!(student.major, "");
        assert_eq!(student.major_display(), "-");
        assert_eq!(student.year, 0);
    }

    #[test]
    fn test_parse_auth_response() {
        let json = r#"{
            "accessToken": "eyJhbGciOiJIUzI1NiJ9.access",
            "refreshToken": "d41d8cd98f00b204e9800998ecf8427e",
            "student": {"id":1,"firstName":"Ada","lastName":"Lovelace","email":"ada@example.edu","major":"","year":2}
        }"#;
        let resp: AuthResponse = serde_json::from_str(json).expect("Failed to parse auth response");
        assert_eq!(resp.access_token, "eyJhbGciOiJIUzI1NiJ9.access");
        assert_eq!(resp.refresh_token, "d41d8cd98f00b204e9800998ecf8427e");
        assert_eq!(resp.student.email, "ada@example.edu");
    }
}
