#![forbid(unsafe_code)]

pub mod resolve;
pub mod snapshot;

pub mod ids {
    #[derive(Clone, Debug, PartialEq, Eq, Hash)]
    pub struct TeamId(String);

    impl TeamId {
        pub fn as_str(&self) -> &str {
            &self.0
        }

        pub fn try_new(value: impl Into<String>) -> Result<Self, TeamIdError> {
            let value = value.into();
            validate_team_id(&value)?;
            Ok(Self(value))
        }
    }

    #[derive(Clone, Debug, PartialEq, Eq)]
    pub enum TeamIdError {
        Empty,
        TooLong,
        InvalidFirstChar,
        InvalidChar { ch: char, index: usize },
    }

    fn validate_team_id(value: &str) -> Result<(), TeamIdError> {
        if value.is_empty() {
            return Err(TeamIdError::Empty);
        }
        if value.len() > 128 {
            return Err(TeamIdError::TooLong);
        }
        let mut chars = value.chars();
        let Some(first) = chars.next() else {
            return Err(TeamIdError::Empty);
        };
        if !first.is_ascii_alphanumeric() {
            return Err(TeamIdError::InvalidFirstChar);
        }
        for (index, ch) in value.chars().enumerate() {
            if index == 0 {
                continue;
            }
            if ch.is_ascii_alphanumeric() || matches!(ch, '.' | '_' | '/' | '-') {
                continue;
            }
            return Err(TeamIdError::InvalidChar { ch, index });
        }
        Ok(())
    }
}

pub mod model {
    /// Default swatch applied when create-project omits a color.
    pub const DEFAULT_PROJECT_COLOR: &str = "#6366F1";

    pub const PRIORITY_NAMES: &[&str] = &["none", "low", "medium", "high", "urgent"];

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub enum Priority {
        None,
        Low,
        Medium,
        High,
        Urgent,
    }

    impl Priority {
        pub fn as_str(self) -> &'static str {
            match self {
                Priority::None => "none",
                Priority::Low => "low",
                Priority::Medium => "medium",
                Priority::High => "high",
                Priority::Urgent => "urgent",
            }
        }

        /// Only explicit spellings parse; an absent priority is never defaulted.
        pub fn parse(value: &str) -> Option<Self> {
            match value.trim().to_ascii_lowercase().as_str() {
                "none" => Some(Priority::None),
                "low" => Some(Priority::Low),
                "medium" => Some(Priority::Medium),
                "high" => Some(Priority::High),
                "urgent" => Some(Priority::Urgent),
                _ => None,
            }
        }
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub enum StateType {
        Unstarted,
        Started,
        Completed,
        Canceled,
    }

    impl StateType {
        pub fn as_str(self) -> &'static str {
            match self {
                StateType::Unstarted => "unstarted",
                StateType::Started => "started",
                StateType::Completed => "completed",
                StateType::Canceled => "canceled",
            }
        }

        pub fn parse(value: &str) -> Option<Self> {
            match value.trim().to_ascii_lowercase().as_str() {
                "unstarted" => Some(StateType::Unstarted),
                "started" => Some(StateType::Started),
                "completed" => Some(StateType::Completed),
                "canceled" => Some(StateType::Canceled),
                _ => None,
            }
        }
    }

    pub const PROJECT_STATUS_NAMES: &[&str] = &["active", "paused", "completed", "canceled"];

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub enum ProjectStatus {
        Active,
        Paused,
        Completed,
        Canceled,
    }

    impl ProjectStatus {
        pub const DEFAULT: ProjectStatus = ProjectStatus::Active;

        pub fn as_str(self) -> &'static str {
            match self {
                ProjectStatus::Active => "active",
                ProjectStatus::Paused => "paused",
                ProjectStatus::Completed => "completed",
                ProjectStatus::Canceled => "canceled",
            }
        }

        pub fn parse(value: &str) -> Option<Self> {
            match value.trim().to_ascii_lowercase().as_str() {
                "active" => Some(ProjectStatus::Active),
                "paused" => Some(ProjectStatus::Paused),
                "completed" => Some(ProjectStatus::Completed),
                "canceled" => Some(ProjectStatus::Canceled),
                _ => None,
            }
        }
    }

    pub const MEMBER_ROLE_NAMES: &[&str] = &["admin", "developer", "viewer"];

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub enum MemberRole {
        Admin,
        Developer,
        Viewer,
    }

    impl MemberRole {
        pub const DEFAULT: MemberRole = MemberRole::Developer;

        pub fn as_str(self) -> &'static str {
            match self {
                MemberRole::Admin => "admin",
                MemberRole::Developer => "developer",
                MemberRole::Viewer => "viewer",
            }
        }

        pub fn parse(value: &str) -> Option<Self> {
            match value.trim().to_ascii_lowercase().as_str() {
                "admin" => Some(MemberRole::Admin),
                "developer" => Some(MemberRole::Developer),
                "viewer" => Some(MemberRole::Viewer),
                _ => None,
            }
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn priority_parse_accepts_any_case_and_padding() {
            assert_eq!(Priority::parse("  Urgent "), Some(Priority::Urgent));
            assert_eq!(Priority::parse("NONE"), Some(Priority::None));
            assert_eq!(Priority::parse("critical"), None);
            assert_eq!(Priority::parse(""), None);
        }

        #[test]
        fn enum_tables_round_trip() {
            for name in PRIORITY_NAMES {
                let parsed = Priority::parse(name).expect("priority name parses");
                assert_eq!(parsed.as_str(), *name);
            }
            for name in PROJECT_STATUS_NAMES {
                let parsed = ProjectStatus::parse(name).expect("status name parses");
                assert_eq!(parsed.as_str(), *name);
            }
            for name in MEMBER_ROLE_NAMES {
                let parsed = MemberRole::parse(name).expect("role name parses");
                assert_eq!(parsed.as_str(), *name);
            }
        }
    }
}
