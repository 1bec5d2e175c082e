//! Attendance report layout.
//!
//! Positions are PDF points on an A4 page, origin bottom-left.

use sams_models::{AttendanceSummary, ClassAttendanceSummary, ClassRef, StudentProfile};

use crate::modules::attendance::aggregator::format_percentage;
use crate::utils::document::{DocumentCanvas, FontWeight, PdfCanvas};

const LEFT: f32 = 72.0;
const INDENT: f32 = 92.0;
const TITLE_Y: f32 = 800.0;
const STUDENT_Y: f32 = 780.0;
const LINE_STEP: f32 = 20.0;
const BLOCK_GAP: f32 = 30.0;
const COMBINED_START_Y: f32 = 750.0;
const PAGE_BREAK_Y: f32 = 120.0;

fn student_line(student: &StudentProfile) -> String {
    format!("Student: {} ({})", student.full_name, student.roll_no)
}

fn summary_lines(summary: &AttendanceSummary) -> [String; 4] {
    [
        format!("Total Classes: {}", summary.total),
        format!("Present: {}", summary.present),
        format!("Absent: {}", summary.absent),
        format!(
            "Attendance Percentage: {}%",
            format_percentage(summary.percentage)
        ),
    ]
}

/// Single class: title, student, class, then the four tallies.
pub fn write_class_report(
    canvas: &mut dyn DocumentCanvas,
    student: &StudentProfile,
    class: &ClassRef,
    summary: &AttendanceSummary,
) {
    canvas.set_font(FontWeight::Bold, 14.0);
    canvas.draw_text(LEFT, TITLE_Y, "Class-wise Attendance Summary");

    canvas.set_font(FontWeight::Regular, 12.0);
    canvas.draw_text(LEFT, STUDENT_Y, &student_line(student));
    canvas.draw_text(
        LEFT,
        STUDENT_Y - LINE_STEP,
        &format!("Class: {} - {}", class.code, class.title),
    );

    let mut y = STUDENT_Y - 2.0 * LINE_STEP;
    for line in summary_lines(summary) {
        canvas.draw_text(LEFT, y, &line);
        y -= LINE_STEP;
    }
}

/// Every class in one document, one block per class, breaking pages as
/// the blocks run down the sheet.
pub fn write_combined_report(
    canvas: &mut dyn DocumentCanvas,
    student: &StudentProfile,
    classes: &[ClassAttendanceSummary],
) {
    canvas.set_font(FontWeight::Bold, 14.0);
    canvas.draw_text(LEFT, TITLE_Y, "Combined Class-wise Attendance Summary");

    canvas.set_font(FontWeight::Regular, 12.0);
    canvas.draw_text(LEFT, STUDENT_Y, &student_line(student));

    let mut y = COMBINED_START_Y;
    for entry in classes {
        if y < PAGE_BREAK_Y {
            canvas.show_page();
            y = TITLE_Y;
        }

        canvas.set_font(FontWeight::Bold, 12.0);
        canvas.draw_text(LEFT, y, &format!("{} - {}", entry.class.code, entry.class.title));

        canvas.set_font(FontWeight::Regular, 12.0);
        for line in summary_lines(&entry.summary) {
            y -= LINE_STEP;
            canvas.draw_text(INDENT, y, &line);
        }
        y -= BLOCK_GAP;
    }
}

pub fn class_report_filename(student: &StudentProfile, class: &ClassRef) -> String {
    format!("{}_{}.pdf", student.full_name, class.code)
}

pub fn combined_report_filename(student: &StudentProfile) -> String {
    format!("{}_class_summaries.pdf", student.full_name)
}

pub fn render_class_report(
    student: &StudentProfile,
    class: &ClassRef,
    summary: &AttendanceSummary,
) -> Vec<u8> {
    let mut canvas = PdfCanvas::new();
    write_class_report(&mut canvas, student, class, summary);
    canvas.finish()
}

pub fn render_combined_report(
    student: &StudentProfile,
    classes: &[ClassAttendanceSummary],
) -> Vec<u8> {
    let mut canvas = PdfCanvas::new();
    write_combined_report(&mut canvas, student, classes);
    canvas.finish()
}
