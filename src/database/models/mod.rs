pub mod coaching_log;
pub mod learner;
pub mod prompt;
pub mod reflection;
pub mod team;
pub mod user;

pub use coaching_log::{CoachingLog, LogStatus, NewCoachingLog, SessionType};
pub use learner::{Coach, Learner};
pub use prompt::{NewPromptTemplate, PromptTemplate, DEFAULT_PROMPT_PURPOSE};
pub use reflection::{LearnerReflection, NewReflection, Reflection, ReflectionView};
pub use team::{NewTeam, Team};
pub use user::{NewUser, User};
