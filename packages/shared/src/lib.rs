//! # Shared data model for Hireform
//!
//! Types that cross the boundary between the auth gateway, the backend API and the
//! front ends. Everything here is plain `Serialize + Deserialize` data with camelCase
//! JSON field names.
//!
//! | Module | Types |
//! |--------|-------|
//! | [`user`] | [`User`], [`Role`], [`UserStore`] |
//! | [`org`] | [`Org`], [`Member`], [`OrgRole`], [`Job`], [`View`] |
//! | [`forms`] | [`FormElement`], [`FormData`], [`FormSettings`], [`FormResponse`], [`Question`] |

pub mod forms;
pub mod org;
pub mod user;

pub use forms::{
    ChoiceElement, ElementType, FieldValue, Form, FormData, FormElement, FormResponse,
    FormSettings, NoOptions, PlainElement, Question, QuestionType,
};
pub use org::{Job, Member, Org, OrgRole, View};
pub use user::{Role, UnknownRole, User, UserStore};
