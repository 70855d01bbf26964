#[path = "_arch/aarch64/errno.rs"]
mod arch_errno;

use crate::errno_decl;

errno_decl!(
    EINVAL = 22 => "Invalid argument",
    EALIGN = 200 => "Misaligned address",
    ENOMEM = 12 => "Out of page-table memory",
    ERANGE = 34 => "Address outside the mapped span",
    ENOTSUP = 95 => "Not supported by this CPU"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_errno_display() {
        assert_eq!(format!("{}", ENOMEM), "12,Out of page-table memory");
        assert_eq!(format!("{:?}", EALIGN), "Misaligned address");
        assert_eq!(EINVAL.code(), 22);
        assert!(core::ptr::eq(ERANGE, ERANGE));
    }
}
