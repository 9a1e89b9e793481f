//! Tests for TaggedLineReader

use std::io::{self, Cursor, Read};

use rstest::rstest;

use cadtree::application::readers::{ModelReader, TaggedLineReader};
use cadtree::domain::{render_lines, render_tree, Model, ModelSummary, MAX_DEPTH};
use cadtree::util::testing::{init_test_setup, lines};

fn read(content: &str) -> Model {
    read_bytes(content.as_bytes())
}

fn read_bytes(content: &[u8]) -> Model {
    init_test_setup();
    let mut stream = Cursor::new(content.to_vec());
    TaggedLineReader::new().read_model(&mut stream)
}

/// Serves its data, then fails every further read.
struct FailingAfter {
    data: Cursor<Vec<u8>>,
}

impl Read for FailingAfter {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.data.read(buf)?;
        if n == 0 {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "connection lost"));
        }
        Ok(n)
    }
}

#[test]
fn given_two_assemblies_out_of_order_when_listing_then_sorted_at_every_level() {
    // Arrange
    let content = "Assembly: B\nPart: B2\nPart: B1\nEndAssembly\nAssembly: A\nPart: A2\nPart: A1\nEndAssembly\n";

    // Act
    let model = read(content);

    // Assert
    assert_eq!(
        render_lines(&model),
        lines(&[
            "Assembly: Root",
            "  Assembly: A",
            "    Part: A1",
            "    Part: A2",
            "  Assembly: B",
            "    Part: B1",
            "    Part: B2",
        ])
    );
}

#[rstest]
#[case::empty("")]
#[case::blank_lines("\n\n   \n")]
#[case::unmatched_end("EndAssembly\nEndAssembly\n")]
#[case::unknown_tags("Component: X\nassembly: lower\n# comment\n")]
fn given_no_structure_when_reading_then_root_only(#[case] content: &str) {
    // Act
    let model = read(content);

    // Assert
    assert_eq!(model, Model::empty());
    assert_eq!(render_lines(&model), lines(&["Assembly: Root"]));
}

#[test]
fn given_part_before_any_assembly_when_reading_then_attached_to_root() {
    // Act
    let model = read("Part: Loose\nAssembly: A\nEndAssembly\n");

    // Assert
    assert_eq!(
        render_lines(&model),
        lines(&["Assembly: Root", "  Part: Loose", "  Assembly: A"])
    );
}

#[test]
fn given_unterminated_assemblies_when_input_ends_then_closed_innermost_first() {
    // Act
    let model = read("Assembly: Outer\nAssembly: Inner\nPart: Pin\n");

    // Assert
    assert_eq!(
        render_lines(&model),
        lines(&[
            "Assembly: Root",
            "  Assembly: Outer",
            "    Assembly: Inner",
            "      Part: Pin",
        ])
    );
}

#[test]
fn given_indented_lines_with_crlf_when_reading_then_names_are_trimmed() {
    // Act
    let model = read("  Assembly:   Gearbox  \r\n\tPart:  Shaft \r\n EndAssembly \r\n");

    // Assert
    let root = model.root();
    assert_eq!(root.children.len(), 1);
    assert_eq!(root.children[0].name, "Gearbox");
    assert_eq!(root.children[0].parts[0].name, "Shaft");
}

#[test]
fn given_extra_end_inside_nesting_when_reading_then_later_parts_go_to_root() {
    // Act
    let model = read("Assembly: A\nEndAssembly\nEndAssembly\nPart: P\n");

    // Assert
    assert_eq!(
        render_lines(&model),
        lines(&["Assembly: Root", "  Part: P", "  Assembly: A"])
    );
}

#[test]
fn given_empty_names_when_reading_then_kept_as_empty() {
    // Act
    let model = read("Assembly:\nPart:\nEndAssembly\n");

    // Assert
    assert_eq!(
        render_lines(&model),
        lines(&["Assembly: Root", "  Assembly: ", "    Part: "])
    );
}

#[test]
fn given_stream_failing_midway_when_reading_then_keeps_what_was_read() {
    // Arrange
    init_test_setup();
    let mut stream = FailingAfter {
        data: Cursor::new(b"Assembly: A\nPart: P\n".to_vec()),
    };

    // Act
    let model = TaggedLineReader::new().read_model(&mut stream);

    // Assert
    assert_eq!(
        render_lines(&model),
        lines(&["Assembly: Root", "  Assembly: A", "    Part: P"])
    );
}

#[test]
fn given_latin1_byte_in_name_when_reading_then_later_lines_kept() {
    // Arrange
    let content =
        b"Assembly: A\nPart: M\xfcller\nPart: B\nEndAssembly\nAssembly: C\nEndAssembly\n";

    // Act
    let model = read_bytes(content);

    // Assert
    assert_eq!(
        render_lines(&model),
        lines(&[
            "Assembly: Root",
            "  Assembly: A",
            "    Part: B",
            "    Part: M\u{FFFD}ller",
            "  Assembly: C",
        ])
    );
}

#[test]
fn given_nesting_far_past_limit_when_rendering_then_flattened_without_crash() {
    // Arrange
    let levels = 5_000;
    let content = format!(
        "{}Part: Deep\n{}Part: After\n",
        "Assembly: X\n".repeat(levels),
        "EndAssembly\n".repeat(levels)
    );

    // Act
    let model = read(&content);
    let listing = render_lines(&model);
    let tree = render_tree(&model).to_string();

    // Assert
    let summary = ModelSummary::from(&model);
    assert_eq!(summary.depth, MAX_DEPTH + 1);
    assert_eq!(summary.assemblies, MAX_DEPTH + 1);
    assert_eq!(listing.len(), MAX_DEPTH + 3);
    assert_eq!(listing[1], "  Part: After");
    assert_eq!(
        listing[MAX_DEPTH + 2],
        format!("{}Part: Deep", "  ".repeat(MAX_DEPTH + 1))
    );
    assert_eq!(tree.lines().count(), MAX_DEPTH + 3);
}
