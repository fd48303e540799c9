use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex_lite::Regex;

use crate::error::{Error, Result};

static BORDER_ROW: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[#.]+$").unwrap());
static INTERIOR_ROW: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#[.<>^v]+#$").unwrap());

/// Obstacle glyphs with the direction each one travels per minute.
const KINDS: [(u8, i32, i32); 4] = [
    (b'>', 1, 0),
    (b'<', -1, 0),
    (b'v', 0, 1),
    (b'^', 0, -1),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pos {
    pub x: i32,
    pub y: i32,
}

impl Pos {
    pub fn new(x: i32, y: i32) -> Self {
        Pos { x, y }
    }

    pub fn translate(self, dx: i32, dy: i32) -> Self {
        Pos::new(self.x + dx, self.y + dy)
    }

    pub fn manhattan(self, o: Pos) -> usize {
        (self.x.abs_diff(o.x) + self.y.abs_diff(o.y)) as usize
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// The valley as it looks at minute 0, walls included.
#[derive(Clone, Debug)]
pub struct Grid {
    cells: Vec<u8>,
    width: usize,
    height: usize,
    start: Pos,
    target: Pos,
}

impl FromStr for Grid {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        // Only trailing newlines are forgiven; a blank row inside the map is an error.
        let lines: Vec<&str> = s.trim_end_matches(['\n', '\r']).lines().collect();
        let height = lines.len();
        let width = lines.first().map_or(0, |l| l.len());
        if height < 3 {
            return Err(Error::TooSmall);
        }

        let mut cells = Vec::with_capacity(width * height);
        let mut openings: Vec<Pos> = Vec::new();
        for (y, line) in lines.iter().enumerate() {
            let malformed = |reason: String| Error::Malformed { line: y + 1, reason };
            if line.is_empty() {
                return Err(malformed("blank row".to_string()));
            }
            if line.trim() != *line {
                return Err(malformed("row is padded with whitespace".to_string()));
            }
            if y == 0 && width < 3 {
                return Err(Error::TooSmall);
            }
            if line.len() != width {
                return Err(malformed(format!("expected {} columns, found {}", width, line.len())));
            }

            if y == 0 || y == height - 1 {
                if !BORDER_ROW.is_match(line) {
                    return Err(malformed(format!("border row may only hold '#' and '.': {line}")));
                }
                let found: Vec<usize> = line.bytes().enumerate()
                    .filter(|&(_, b)| b == b'.')
                    .map(|(x, _)| x)
                    .collect();
                let [x] = found[..] else {
                    return Err(Error::Openings { line: y + 1, found: found.len() });
                };
                if x == 0 || x == width - 1 {
                    return Err(malformed("opening may not sit in a corner".to_string()));
                }
                openings.push(Pos::new(x as i32, y as i32));
            } else if !INTERIOR_ROW.is_match(line) {
                return Err(malformed(format!("unexpected row: {line}")));
            }
            cells.extend_from_slice(line.as_bytes());
        }

        Ok(Grid {
            cells,
            width,
            height,
            start: openings[0],
            target: openings[1],
        })
    }
}

impl Grid {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn start(&self) -> Pos {
        self.start
    }

    pub fn target(&self) -> Pos {
        self.target
    }

    pub fn interior_width(&self) -> usize {
        self.width - 2
    }

    pub fn interior_height(&self) -> usize {
        self.height - 2
    }

    pub fn is_interior(&self, p: Pos) -> bool {
        (1..self.width as i32 - 1).contains(&p.x) && (1..self.height as i32 - 1).contains(&p.y)
    }

    /// The start and target cells, as long as they haven't been walled over.
    pub fn is_boundary_opening(&self, p: Pos) -> bool {
        (p == self.start || p == self.target) && self.at(p) == b'.'
    }

    /// Whether `p` sits on the top or bottom border row.
    pub fn is_boundary_row(&self, p: Pos) -> bool {
        p.y == 0 || p.y == self.height as i32 - 1
    }

    fn at(&self, p: Pos) -> u8 {
        self.cells[p.y as usize * self.width + p.x as usize]
    }

    // Interior coordinates are 0-based for the modulus, so remove the wall and add it back.
    fn wrap(&self, p: Pos) -> Pos {
        let w = self.interior_width() as i32;
        let h = self.interior_height() as i32;
        Pos::new((p.x - 1).rem_euclid(w) + 1, (p.y - 1).rem_euclid(h) + 1)
    }

    /// Glyphs of the obstacles covering `p` at minute `t`.
    ///
    /// An obstacle moving in direction d that covers `p` at minute `t` started out `t` steps
    /// against d, wrapped around the interior, so only four cells of the minute-0 board need to
    /// be consulted.
    pub fn arrivals(&self, p: Pos, t: usize) -> impl Iterator<Item = u8> + '_ {
        let sx = (t % self.interior_width()) as i32;
        let sy = (t % self.interior_height()) as i32;
        KINDS.iter().filter_map(move |&(glyph, dx, dy)| {
            let src = self.wrap(p.translate(-dx * sx, -dy * sy));
            (self.at(src) == glyph).then_some(glyph)
        })
    }

    /// Uncached obstacle rule, wall-agnostic.
    pub fn obstacle_at(&self, p: Pos, t: usize) -> bool {
        self.arrivals(p, t).next().is_some()
    }

    /// Draws the valley at minute `t`. Cells covered by several obstacles show their count.
    pub fn render(&self, t: usize) -> String {
        let mut out = String::with_capacity((self.width + 1) * self.height);
        for y in 0..self.height {
            for x in 0..self.width {
                let p = Pos::new(x as i32, y as i32);
                if !self.is_interior(p) {
                    out.push(self.at(p) as char);
                    continue;
                }
                let here: Vec<u8> = self.arrivals(p, t).collect();
                match here[..] {
                    [] => out.push('.'),
                    [glyph] => out.push(glyph as char),
                    _ => out.push_str(&here.len().to_string()),
                }
            }
            out.push('\n');
        }
        out
    }

    #[cfg(test)]
    pub(crate) fn seal(&mut self, p: Pos) {
        let i = p.y as usize * self.width + p.x as usize;
        self.cells[i] = b'#';
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::fixtures::EXAMPLE;

    fn grid() -> Grid {
        EXAMPLE.parse().unwrap()
    }

    #[test]
    fn test_from_str() {
        let grid = grid();
        assert_eq!(grid.width(), 8);
        assert_eq!(grid.height(), 6);
        assert_eq!(grid.start(), Pos::new(1, 0));
        assert_eq!(grid.target(), Pos::new(6, 5));
        assert_eq!(grid.interior_width(), 6);
        assert_eq!(grid.interior_height(), 4);
    }

    #[test]
    fn test_ragged_rows() {
        let err = "#.###\n#..#\n###.#".parse::<Grid>().unwrap_err();
        assert!(matches!(err, Error::Malformed { line: 2, .. }), "{err}");
    }

    #[test]
    fn test_bad_char() {
        let err = "#.###\n#.x.#\n###.#".parse::<Grid>().unwrap_err();
        assert!(matches!(err, Error::Malformed { line: 2, .. }), "{err}");
    }

    #[test]
    fn test_missing_side_wall() {
        let err = "#.###\n#....\n###.#".parse::<Grid>().unwrap_err();
        assert!(matches!(err, Error::Malformed { line: 2, .. }), "{err}");
    }

    #[test]
    fn test_openings() {
        let err = "#####\n#...#\n###.#".parse::<Grid>().unwrap_err();
        assert!(matches!(err, Error::Openings { line: 1, found: 0 }), "{err}");
        let err = "#.###\n#...#\n#..##".parse::<Grid>().unwrap_err();
        assert!(matches!(err, Error::Openings { line: 3, found: 2 }), "{err}");
    }

    #[test]
    fn test_blank_row() {
        let err = "#.###\n#...#\n\n#...#\n###.#".parse::<Grid>().unwrap_err();
        assert!(matches!(err, Error::Malformed { line: 3, .. }), "{err}");
        let err = "\n#.###\n#...#\n###.#".parse::<Grid>().unwrap_err();
        assert!(matches!(err, Error::Malformed { line: 1, .. }), "{err}");
    }

    #[test]
    fn test_padded_row() {
        let err = "#.###   \n#...#\n###.#".parse::<Grid>().unwrap_err();
        assert!(matches!(err, Error::Malformed { line: 1, .. }), "{err}");
        let err = "#.###\n #...#\n###.#".parse::<Grid>().unwrap_err();
        assert!(matches!(err, Error::Malformed { line: 2, .. }), "{err}");
    }

    #[test]
    fn test_trailing_newlines() {
        let grid: Grid = "#.###\n#...#\n###.#\n\n".parse().unwrap();
        assert_eq!(grid.height(), 3);
        let grid: Grid = "#.###\r\n#...#\r\n###.#\r\n".parse().unwrap();
        assert_eq!(grid.width(), 5);
    }

    #[test]
    fn test_too_small() {
        assert!(matches!("#.#\n#.#".parse::<Grid>(), Err(Error::TooSmall)));
    }

    #[test]
    fn test_is_interior() {
        let grid = grid();
        assert!(grid.is_interior(Pos::new(1, 1)));
        assert!(grid.is_interior(Pos::new(6, 4)));
        assert!(!grid.is_interior(grid.start()));
        assert!(!grid.is_interior(Pos::new(7, 2)));
        assert!(grid.is_boundary_opening(grid.target()));
        assert!(!grid.is_boundary_opening(Pos::new(2, 0)));
    }

    #[test]
    fn test_obstacle_horizontal() {
        let grid = grid();
        // The '<' at (6, 1) moves left one column per minute.
        assert!(grid.arrivals(Pos::new(6, 1), 0).any(|g| g == b'<'));
        assert!(grid.arrivals(Pos::new(5, 1), 1).any(|g| g == b'<'));
        assert!(grid.arrivals(Pos::new(1, 1), 5).any(|g| g == b'<'));
        assert!(grid.arrivals(Pos::new(6, 1), 6).any(|g| g == b'<'));
    }

    #[test]
    fn test_obstacle_vertical() {
        let grid = grid();
        // The '^' at (5, 1) wraps to the bottom interior row.
        assert!(grid.arrivals(Pos::new(5, 4), 1).any(|g| g == b'^'));
        assert!(grid.arrivals(Pos::new(5, 3), 2).any(|g| g == b'^'));
    }

    #[test]
    fn test_render() {
        let grid = grid();
        assert_eq!(grid.render(0), format!("{EXAMPLE}\n"));
        let minute1 = "\
#.######
#.>3.<.#
#<..<<.#
#>2.22.#
#>v..^<#
######.#
";
        assert_eq!(grid.render(1), minute1);
    }

    #[test]
    fn test_seal() {
        let mut grid = grid();
        let target = grid.target();
        grid.seal(target);
        assert!(!grid.is_boundary_opening(target));
        assert!(grid.render(0).ends_with("########\n"));
    }
}
