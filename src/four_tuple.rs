// four_tuple.rs
use std::fmt;

// 流标识：源地址、源端口、目的地址、目的端口
// 输入里地址和端口都只是不透明的 token，不做 IP 解析
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FourTuple {
    pub src: String,
    pub src_port: String,
    pub dst: String,
    pub dst_port: String,
}

impl FourTuple {
    pub fn new(
        src: impl Into<String>,
        src_port: impl Into<String>,
        dst: impl Into<String>,
        dst_port: impl Into<String>,
    ) -> Self {
        Self {
            src: src.into(),
            src_port: src_port.into(),
            dst: dst.into(),
            dst_port: dst_port.into(),
        }
    }
}

// 从四个字段直接构造，解析器拿到切片后用
impl From<[&str; 4]> for FourTuple {
    fn from([src, src_port, dst, dst_port]: [&str; 4]) -> Self {
        FourTuple::new(src, src_port, dst, dst_port)
    }
}

// 输出格式：四个字段用空格拼起来
impl fmt::Display for FourTuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.src, self.src_port, self.dst, self.dst_port
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_joins_fields_with_spaces() {
        let key = FourTuple::from(["10.0.0.1", "80", "10.0.0.2", "8080"]);
        assert_eq!(key.to_string(), "10.0.0.1 80 10.0.0.2 8080");
    }

    #[test]
    fn equality_covers_all_four_fields() {
        let a = FourTuple::new("A", "1", "B", "1");
        assert_eq!(a, FourTuple::from(["A", "1", "B", "1"]));
        assert_ne!(a, FourTuple::from(["A", "1", "B", "2"]));
        assert_ne!(a, FourTuple::from(["B", "1", "A", "1"]));
    }
}
