//! Permission code constants.
//!
//! Centralized permission strings used by the request gate maps and the
//! setup seeder. Using these constants instead of string literals keeps
//! the declarative route tables and the seeded catalog in sync.

// Profile
pub const VIEW_PROFILE: &str = "view_profile";
pub const EDIT_PROFILE: &str = "edit_profile";

// Users
pub const VIEW_ALL_USERS: &str = "view_all_users";
pub const EDIT_ALL_USERS: &str = "edit_all_users";

// Roles
pub const MANAGE_ROLES: &str = "manage_roles";

// Assignments
pub const VIEW_ASSIGNMENTS: &str = "view_assignments";
pub const MANAGE_ASSIGNMENTS: &str = "manage_assignments";
pub const SUBMIT_ASSIGNMENTS: &str = "submit_assignments";
pub const VIEW_SUBMISSIONS: &str = "view_submissions";
pub const GRADE_SUBMISSIONS: &str = "grade_submissions";

// Exams
pub const VIEW_EXAMS: &str = "view_exams";
pub const MANAGE_EXAMS: &str = "manage_exams";
pub const TAKE_EXAMS: &str = "take_exams";

// Reporting
pub const GENERATE_REPORTS: &str = "generate_reports";

/// The full catalog seeded at setup, with descriptions.
pub const CATALOG: &[(&str, &str)] = &[
    (VIEW_PROFILE, "Can view own profile"),
    (EDIT_PROFILE, "Can edit own profile"),
    (VIEW_ALL_USERS, "Can view all users"),
    (EDIT_ALL_USERS, "Can edit all users"),
    (MANAGE_ROLES, "Can manage roles and permissions"),
    (VIEW_ASSIGNMENTS, "Can view assignments"),
    (MANAGE_ASSIGNMENTS, "Can create, update and delete assignments"),
    (SUBMIT_ASSIGNMENTS, "Can submit and resubmit assignments"),
    (VIEW_SUBMISSIONS, "Can view submissions"),
    (GRADE_SUBMISSIONS, "Can grade submissions and request resubmission"),
    (VIEW_EXAMS, "Can view exams and exam results"),
    (MANAGE_EXAMS, "Can manage question banks, blueprints and exam instances"),
    (TAKE_EXAMS, "Can take exams"),
    (GENERATE_REPORTS, "Can generate reports"),
];
