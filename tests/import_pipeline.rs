//! End-to-end parse tests: schedule-listing fixture feeding the section
//! scraper's period-type join, without any network or database.

use html_scraper::Html;

use registrar::models::ClassType;
use registrar::sis::parse_sections_document;
use registrar::sis::schedule::parse_period_types;

/// The legacy schedule listing for the fixture semester. CRN 40432 has a
/// Monday/Thursday lecture and a Wednesday evening test block whose times
/// only label the end with PM.
const SCHEDULE_LISTING: &str = r#"<html><body><table>
<tr align="LEFT"><td>40432 CSCI-1200-01</td><td>DATA STRUCTURES</td><td>LEC</td><td></td><td>4.0</td><td></td><td>MR</td><td>10:10</td><td>12:00PM</td><td>Cutler</td></tr>
<tr align="LEFT"><td></td><td></td><td>TES</td><td></td><td></td><td></td><td>W</td><td>9:05</td><td>9:55PM</td><td>Cutler</td></tr>
<tr align="LEFT"><td></td><td>NOTE:</td><td></td><td></td><td></td><td></td><td></td><td></td><td></td><td></td></tr>
<tr align="LEFT"><td>42608 BIOL-1010-01</td><td>INTRODUCTION TO BIOLOGY</td><td>LEC</td><td></td><td>4</td><td></td><td>MR</td><td>10:10</td><td>12:00PM</td><td>Hanna</td></tr>
<tr align="LEFT"><td></td><td></td><td>LAB</td><td></td><td></td><td></td><td>F</td><td>2:30</td><td>4:20PM</td><td>Hanna</td></tr>
</table></body></html>"#;

fn td(text: &str) -> String {
    format!("<td>{text}</td>")
}

/// Build a full-width search results row. SIS rows carry 23 columns once
/// colspans are expanded; index 1 is the CRN.
fn search_row(
    crn: &str,
    subject: &str,
    number: &str,
    section: &str,
    credits: &str,
    title: &str,
    days: &str,
    time: &str,
    instructor: &str,
) -> String {
    let mut cells = vec![
        td(""),
        td(crn),
        td(subject),
        td(number),
        td(section),
        td("TROY"),
        td(credits),
        td(title),
        td(days),
        td(time),
        td("100"),
        td("90"),
        td("10"),
        td("3"),
    ];
    cells.extend(std::iter::repeat_n(td(""), 5)); // 14-18
    cells.push(td(instructor)); // 19
    cells.push(td("01/25-05/12")); // 20
    cells.push(td("DCC 318")); // 21
    cells.push(td("")); // 22
    format!("<tr>{}</tr>", cells.concat())
}

/// A continuation row: the leading identity cells are collapsed behind a
/// colspan, which the scraper must re-expand.
fn continuation_row(days: &str, time: &str, instructor: &str) -> String {
    let mut cells = vec![r#"<td colspan="2"></td>"#.to_owned()];
    cells.extend(std::iter::repeat_n(td(""), 6)); // 2-7
    cells.push(td(days)); // 8
    cells.push(td(time)); // 9
    cells.extend(std::iter::repeat_n(td(""), 9)); // 10-18
    cells.push(td(instructor)); // 19
    cells.extend(std::iter::repeat_n(td(""), 3)); // 20-22
    format!("<tr>{}</tr>", cells.concat())
}

fn search_page(rows: &[String]) -> Html {
    Html::parse_document(&format!(
        r#"<html><body><table><caption>Sections Found</caption>
        <tr><th>header</th></tr><tr><th>header</th></tr>
        {}</table></body></html>"#,
        rows.concat()
    ))
}

#[test]
fn schedule_listing_regression_fixture() {
    let types = parse_period_types(&Html::parse_document(SCHEDULE_LISTING)).unwrap();

    // The documented literal fixture: CRN 40432, Wednesday, 21:05 is a test.
    assert_eq!(
        types.get(&("40432".to_owned(), 3, Some("21:05".to_owned()))),
        Some(&ClassType::Test)
    );
    assert_eq!(
        types.get(&("40432".to_owned(), 1, Some("10:10".to_owned()))),
        Some(&ClassType::Lecture)
    );
    assert_eq!(
        types.get(&("42608".to_owned(), 5, Some("14:30".to_owned()))),
        Some(&ClassType::Lab)
    );
}

#[test]
fn scrape_joins_period_types_across_sources() {
    let types = parse_period_types(&Html::parse_document(SCHEDULE_LISTING)).unwrap();

    let page = search_page(&[
        search_row(
            "40432", "CSCI", "1200", "01", "4", "DATA STRUCTURES", "MR",
            "10:10 am-12:00 pm", "Cutler (P)",
        ),
        continuation_row("W", "9:05 pm-9:55 pm", "Cutler"),
        search_row(
            "42608", "BIOL", "1010", "01", "4", "INTRODUCTION TO BIOLOGY", "MR",
            "10:10 am-12:00 pm", "Hanna (P), Shablovsky",
        ),
        continuation_row("F", "2:30 pm-4:20 pm", "Hanna"),
        search_row(
            "44854", "ARCH", "4100", "01", "1-3", "ARCH DESIGN STUDIO", "TF",
            "9:00 am-11:50 am", "Oatman",
        ),
    ]);

    let sections = parse_sections_document(&page, "202101", &types).unwrap();

    // 3 section-header rows + 2 continuation rows = 3 sections, 5 periods.
    assert_eq!(sections.len(), 3);
    assert_eq!(sections.iter().map(|s| s.periods.len()).sum::<usize>(), 5);

    let csci = &sections[0];
    assert_eq!(csci.crn, "40432");
    assert_eq!(csci.periods[0].class_type, Some(ClassType::Lecture));
    // The Wednesday evening block resolves to a test via the listing join.
    assert_eq!(csci.periods[1].class_type, Some(ClassType::Test));
    assert_eq!(csci.periods[1].start_time.as_deref(), Some("21:05"));

    let biol = &sections[1];
    assert_eq!(biol.periods[1].class_type, Some(ClassType::Lab));
    assert_eq!(biol.periods[0].instructors, vec!["Hanna", "Shablovsky"]);

    // No listing entry for the studio section: defaults to lecture.
    let arch = &sections[2];
    assert_eq!(arch.periods[0].class_type, Some(ClassType::Lecture));
    assert_eq!(arch.credits, vec![1, 2, 3]);
}
