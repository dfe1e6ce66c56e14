use std::fs;

use nom::IResult;
use nom::bytes::complete::tag;
use nom::character::complete::{alphanumeric1, digit1, space0, space1};
use nom::combinator::map_res;
use nom::sequence::{preceded, terminated, tuple};

use crate::error::CliqueError;
use crate::graph::Graph;


/// reads a DIMACS graph file (.clq/.col), returns the graph
pub fn read_from_file(filename:&str) -> Result<Graph, CliqueError> {
    let content = fs::read_to_string(filename)
        .map_err(|e| CliqueError::io(filename, e))?;
    read_from_str(&content)
}

/** reads a DIMACS graph from a string:
 - `c ...` comment lines are skipped
 - `p <name> <n> <m>` header
 - `e <u> <v>` edges (WARNING: indices start at 1 in the DIMACS format)
*/
pub fn read_from_str(content:&str) -> Result<Graph, CliqueError> {
    let mut header:Option<(usize,usize)> = None;
    let mut edges = Vec::new();
    for (i,raw_line) in content.lines().enumerate() {
        let line_number = i+1;
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('c') { continue; }
        if line.starts_with('p') {
            let (_,(n,m)) = read_header(line).map_err(|_| CliqueError::Parse {
                line: line_number, msg: format!("invalid header \"{}\"", line)
            })?;
            header = Some((n,m));
        } else if line.starts_with('e') {
            let n = match header {
                None => return Err(CliqueError::Parse {
                    line: line_number, msg: "edge found before the header".to_string()
                }),
                Some((n,_)) => n,
            };
            let (_,(a,b)) = read_edge(line).map_err(|_| CliqueError::Parse {
                line: line_number, msg: format!("invalid edge \"{}\"", line)
            })?;
            if a == 0 || b == 0 || a > n || b > n {
                return Err(CliqueError::Parse {
                    line: line_number,
                    msg: format!("edge ({},{}) references a vertex outside 1..={}", a, b, n)
                });
            }
            edges.push((a-1,b-1));
        }
        // other lines are ignored
    }
    match header {
        None => Err(CliqueError::Parse { line: 0, msg: "missing \"p\" header".to_string() }),
        Some((n,_)) => Ok(Graph::from_edges(n, &edges)),
    }
}

/// reads an unsigned integer
fn read_integer(s:&str) -> IResult<&str, usize> {
    map_res(digit1, |d:&str| d.parse::<usize>())(s)
}

/// reads two numbers separated by spaces
fn read_two_integers(s:&str) -> IResult<&str, (usize,usize)> {
    let (remaining,(n1,_,n2)) = tuple((read_integer, space1, read_integer))(s)?;
    let (remaining,_) = space0(remaining)?;
    Ok((remaining,(n1,n2)))
}

/// reads header containing (n,m), for instance "p edge 10 12" or "p col 10 12"
pub fn read_header(s:&str) -> IResult<&str, (usize,usize)> {
    preceded(
        tuple((tag("p"), space1, terminated(alphanumeric1, space1))),
        read_two_integers
    )(s)
}

/// reads edge line "e u v"
pub fn read_edge(s:&str) -> IResult<&str, (usize,usize)> {
    preceded(tuple((tag("e"), space1)), read_two_integers)(s)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_header() {
        let s = "p edge 2 1";
        assert_eq!(read_header(s).unwrap().0, "");
        assert_eq!(read_header(s).unwrap().1, (2,1));
    }

    #[test]
    fn test_read_header_col() {
        assert_eq!(read_header("p col 20 31").unwrap().1, (20,31));
    }

    #[test]
    fn test_read_edge() {
        assert_eq!(read_edge("e 1 2").unwrap().1, (1,2));
        assert_eq!(read_edge("e   4    17 ").unwrap().1, (4,17));
        assert!(read_edge("e 4").is_err());
    }

    #[test]
    fn test_read_graph() {
        let s = "c a small graph\nc second comment\np edge 4 4\ne 1 2\ne 2 3\r\ne 3 4\ne 4 1\n";
        let g = read_from_str(s).unwrap();
        assert_eq!(g.nb_vertices(), 4);
        assert_eq!(g.nb_edges(), 4);
        assert_eq!(g.neighbors(0), &[1,3]);
    }

    #[test]
    fn test_read_graph_errors() {
        assert!(matches!(read_from_str("e 1 2\n"), Err(CliqueError::Parse { line: 1, .. })));
        assert!(matches!(read_from_str("p edge 2 1\ne 1 3\n"), Err(CliqueError::Parse { line: 2, .. })));
        assert!(matches!(read_from_str("c nothing\n"), Err(CliqueError::Parse { .. })));
        assert!(matches!(read_from_file("does/not/exist.clq"), Err(CliqueError::Io { .. })));
    }
}
