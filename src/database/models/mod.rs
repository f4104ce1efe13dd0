pub mod grade;
pub mod report;
pub mod theme;

pub use grade::{Grade, GradeInput, GradeReplace};
pub use report::{Report, ReportInput};
pub use theme::{Theme, ThemeInput, ThemeWithGrades};
