use std::io::{BufRead, Write};

use remap_api::Shape;
use remap_engine::Mapper;

use crate::error::CliError;
use crate::json;

/// Map every JSON line read from `reader` and write the results to `writer`.
///
/// `shape` is the shape of the input rows. Blank lines are skipped. Rows
/// with nothing to map are written as `null`. Returns the number of rows read.
pub fn remap_lines<R: BufRead, W: Write>(
    mapper: &Mapper,
    shape: Shape,
    reader: R,
    mut writer: W,
) -> Result<usize, CliError> {
    let mut rows = 0;
    let mut empty = 0;

    for (index, line) in reader.lines().enumerate() {
        let line_no = index + 1;
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let parsed: serde_json::Value = serde_json::from_str(&line).map_err(|source| CliError::Json {
            line: line_no,
            source,
        })?;
        let container = json::to_container(parsed, shape)
            .map_err(|source| CliError::Json {
                line: line_no,
                source,
            })?
            .ok_or(CliError::Shape {
                line: line_no,
                expected: json::expected(shape),
            })?;

        let mapped = mapper.map(&container).map_err(|source| CliError::Map {
            line: line_no,
            source,
        })?;
        rows += 1;

        let out = match mapped {
            Some(target) => json::to_json(&target).map_err(|source| CliError::Json {
                line: line_no,
                source,
            })?,
            None => {
                empty += 1;
                tracing::debug!(line = line_no, "nothing to map");
                serde_json::Value::Null
            }
        };
        writeln!(writer, "{out}")?;
    }

    writer.flush()?;
    tracing::info!(rows, empty, "input processed");
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use remap_api::Kind;
    use remap_engine::{ContainerSpec, MappingTable};

    fn mapper() -> Mapper {
        Mapper::new(
            ContainerSpec::sequence(Kind::String).names(["_skip", "id", "qty"]),
            ContainerSpec::mapping(Kind::I64).names(["id", "qty"]),
            Some(MappingTable::new().link("id", "id").link("qty", "qty").into()),
        )
        .unwrap()
    }

    fn run(input: &str) -> Result<(usize, String), CliError> {
        let mut out = Vec::new();
        let rows = remap_lines(
            &mapper(),
            Shape::Sequence(Kind::String),
            input.as_bytes(),
            &mut out,
        )?;
        Ok((rows, String::from_utf8(out).unwrap()))
    }

    #[test]
    fn maps_each_line() {
        let (rows, out) = run("[\"x\", \"7\", \" 3 \"]\n\n[\"y\", \"\", \"\"]\n").unwrap();
        assert_eq!(rows, 2);
        assert_eq!(out, "{\"id\":7,\"qty\":3}\nnull\n");
    }

    #[test]
    fn names_the_failing_line() {
        let err = run("[\"x\", \"1\", \"1\"]\n[\"x\", \"abc\", \"1\"]\n").unwrap_err();
        assert!(matches!(err, CliError::Map { line: 2, .. }));
        assert!(err.to_string().starts_with("line 2: could not convert 'id'"));
    }

    #[test]
    fn rejects_wrong_json_shape() {
        let err = run("{\"id\": 1}\n").unwrap_err();
        assert!(matches!(err, CliError::Shape { line: 1, expected: "array" }));

        let err = run("[\"x\",\n").unwrap_err();
        assert!(matches!(err, CliError::Json { line: 1, .. }));
    }
}
