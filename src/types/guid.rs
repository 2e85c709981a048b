/// Device class a token can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Guid {
    pub tag: &'static str,
    pub long_name: &'static str,
    pub guid: &'static str,
}

static GUID_LIST: [Guid; 7] = [
    Guid {
        tag: "iphone",
        long_name: "iPhone",
        guid: "556f1985-33dd-442c-9155-3a0e994f21b1",
    },
    Guid {
        tag: "android",
        long_name: "Android",
        guid: "a01c4380-fc01-4df0-b113-7fb98ec74694",
    },
    Guid {
        tag: "bb",
        long_name: "BlackBerry",
        guid: "868c28f8-31bf-4911-9876-ebece5c3f2ab",
    },
    Guid {
        tag: "bb10",
        long_name: "BlackBerry 10",
        guid: "b77a1d06-d505-4200-90d3-1bb397748704",
    },
    Guid {
        tag: "winphone",
        long_name: "Windows Phone",
        guid: "c483b592-63f0-4f19-b4cb-a6bce8e57159",
    },
    Guid {
        tag: "win",
        long_name: "Windows",
        guid: "8f94b226-d362-4204-ac52-3b21fa333b6f",
    },
    Guid {
        tag: "mac",
        long_name: "Mac OSX",
        guid: "d0955a53-569b-4ecc-9cf7-6c2a59d4e775",
    },
];

pub fn guid_list() -> &'static [Guid] {
    &GUID_LIST
}

pub fn find_guid(tag: &str) -> Option<&'static Guid> {
    GUID_LIST.iter().find(|g| g.tag.eq_ignore_ascii_case(tag))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_is_ordered_and_unique() {
        let tags: Vec<_> = guid_list().iter().map(|g| g.tag).collect();
        assert_eq!(
            tags,
            ["iphone", "android", "bb", "bb10", "winphone", "win", "mac"]
        );
        for g in guid_list() {
            assert_eq!(g.guid.len(), 36);
        }
    }

    #[test]
    fn lookup_by_tag() {
        assert_eq!(find_guid("BB10").map(|g| g.long_name), Some("BlackBerry 10"));
        assert!(find_guid("palm").is_none());
    }
}
