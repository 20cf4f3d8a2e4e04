//! Parser for the line-oriented OBJ model format
//!
//! Only geometry records are read (`v`, `vn`, `vt`, `f`). Every other record
//! kind is skipped so files carrying groups, materials or smoothing data
//! still load.

use nalgebra::{Point2, Point3, Vector3};
use nom::{
    character::complete::{char, i64 as index_literal},
    combinator::{all_consuming, opt},
    number::complete::float,
    sequence::preceded,
    IResult,
};
use std::io::BufRead;

use crate::error::ParseError;
use crate::geometry::{Face, FaceCorner, GeometryBuffer, Normal, TexCoord, Vertex};

/// A classified source line
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Position(Vertex),
    Normal(Normal),
    TexCoord(TexCoord),
    Face(Vec<CornerRef>),
    /// Blank lines, comments and record kinds this loader does not read
    Ignored,
}

/// Face corner exactly as written: 1-based, negative values count back from the end
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CornerRef {
    pub position: i64,
    pub texcoord: Option<i64>,
    pub normal: Option<i64>,
}

/// Parse model text into a geometry buffer
pub fn parse(text: &str) -> Result<GeometryBuffer, ParseError> {
    parse_lines(text.lines().map(Ok))
}

/// Parse model text streamed from a reader, one line at a time
pub fn parse_reader<R: BufRead>(reader: R) -> Result<GeometryBuffer, ParseError> {
    parse_lines(reader.lines())
}

fn parse_lines<I, S>(lines: I) -> Result<GeometryBuffer, ParseError>
where
    I: Iterator<Item = std::io::Result<S>>,
    S: AsRef<str>,
{
    let mut positions: Vec<Vertex> = Vec::new();
    let mut normals: Vec<Normal> = Vec::new();
    let mut texcoords: Vec<TexCoord> = Vec::new();
    let mut corners: Vec<FaceCorner> = Vec::new();
    let mut faces = 0usize;

    for (i, line) in lines.enumerate() {
        let line = line?;
        let line_number = i + 1;

        match classify(line.as_ref(), line_number)? {
            Record::Position(position) => positions.push(position),
            Record::Normal(normal) => normals.push(normal),
            Record::TexCoord(texcoord) => texcoords.push(texcoord),
            Record::Face(refs) => {
                let face = resolve_face(
                    &refs,
                    line_number,
                    positions.len(),
                    texcoords.len(),
                    normals.len(),
                )?;
                let before = corners.len();
                corners.extend(face.triangulate().flatten());
                log::debug!(
                    "line {}: {}-gon split into {} triangles",
                    line_number,
                    face.corners.len(),
                    (corners.len() - before) / 3
                );
                faces += 1;
            }
            Record::Ignored => {}
        }
    }

    log::info!(
        "Parsed model: {} positions, {} normals, {} texcoords, {} faces",
        positions.len(),
        normals.len(),
        texcoords.len(),
        faces
    );

    Ok(GeometryBuffer::from_corners(
        positions, normals, texcoords, &corners,
    ))
}

/// Classify one source line by its leading token and parse its payload
pub fn classify(line: &str, line_number: usize) -> Result<Record, ParseError> {
    // Everything after `#` is a comment
    let content = match line.find('#') {
        Some(start) => &line[..start],
        None => line,
    };

    let mut fields = content.split_whitespace();
    let keyword = match fields.next() {
        Some(keyword) => keyword,
        None => return Ok(Record::Ignored),
    };
    let fields: Vec<&str> = fields.collect();

    let record = match keyword {
        "v" => {
            let [x, y, z] = parse_floats::<3>(&fields, "v", line_number)?;
            Record::Position(Point3::new(x, y, z))
        }
        "vn" => {
            let [x, y, z] = parse_floats::<3>(&fields, "vn", line_number)?;
            Record::Normal(Vector3::new(x, y, z))
        }
        "vt" => {
            let [u, v] = parse_floats::<2>(&fields, "vt", line_number)?;
            Record::TexCoord(Point2::new(u, v))
        }
        "f" => {
            if fields.len() < 3 {
                return Err(ParseError::DegenerateFace {
                    line: line_number,
                    corners: fields.len(),
                });
            }
            let refs = fields
                .iter()
                .map(|field| parse_corner_ref(field, line_number))
                .collect::<Result<Vec<_>, _>>()?;
            Record::Face(refs)
        }
        other => {
            log::trace!("line {}: ignoring `{}` record", line_number, other);
            Record::Ignored
        }
    };

    Ok(record)
}

/// Read the first `N` fields as finite floats; trailing extras (`w`, vertex colors) are ignored
fn parse_floats<const N: usize>(
    fields: &[&str],
    record: &'static str,
    line_number: usize,
) -> Result<[f32; N], ParseError> {
    if fields.len() < N {
        return Err(ParseError::MissingField {
            line: line_number,
            record,
            expected: N,
            found: fields.len(),
        });
    }

    let mut values = [0.0f32; N];
    for (value, field) in values.iter_mut().zip(fields.iter().copied()) {
        *value = match all_consuming(float::<&str, nom::error::Error<&str>>)(field) {
            Ok((_, parsed)) if parsed.is_finite() => parsed,
            _ => {
                return Err(ParseError::MalformedNumber {
                    line: line_number,
                    field: field.to_string(),
                })
            }
        };
    }
    Ok(values)
}

fn parse_corner_ref(field: &str, line_number: usize) -> Result<CornerRef, ParseError> {
    match all_consuming(corner_ref)(field) {
        Ok((_, corner)) => Ok(corner),
        Err(_) => Err(ParseError::MalformedNumber {
            line: line_number,
            field: field.to_string(),
        }),
    }
}

/// `pos`, `pos/tex`, `pos//norm` or `pos/tex/norm`
fn corner_ref(input: &str) -> IResult<&str, CornerRef> {
    let (input, position) = index_literal(input)?;
    let (input, texcoord) = opt(preceded(char('/'), opt(index_literal)))(input)?;
    let (input, normal) = opt(preceded(char('/'), opt(index_literal)))(input)?;

    Ok((
        input,
        CornerRef {
            position,
            texcoord: texcoord.flatten(),
            normal: normal.flatten(),
        },
    ))
}

fn resolve_face(
    refs: &[CornerRef],
    line_number: usize,
    positions: usize,
    texcoords: usize,
    normals: usize,
) -> Result<Face, ParseError> {
    let corners = refs
        .iter()
        .map(|corner| -> Result<FaceCorner, ParseError> {
            Ok(FaceCorner::new(
                resolve_index(corner.position, positions, line_number)?,
                corner
                    .texcoord
                    .map(|index| resolve_index(index, texcoords, line_number))
                    .transpose()?,
                corner
                    .normal
                    .map(|index| resolve_index(index, normals, line_number))
                    .transpose()?,
            ))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Face::new(corners))
}

/// Translate a 1-based (or negative, relative) reference into a 0-based index
/// against the `count` entries declared so far
fn resolve_index(index: i64, count: usize, line_number: usize) -> Result<u32, ParseError> {
    let count = count as i64;
    let resolved = if index > 0 { index - 1 } else { count + index };

    if index == 0 || resolved < 0 || resolved >= count || resolved > u32::MAX as i64 {
        return Err(ParseError::IndexOutOfRange {
            line: line_number,
            index,
        });
    }
    Ok(resolved as u32)
}
