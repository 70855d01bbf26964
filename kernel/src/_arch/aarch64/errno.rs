#[macro_export]
macro_rules! errno_decl {
    ($($ident:ident = $code:literal => $literal:literal), *) => {
        pub enum SysError{
            $($ident(u8,&'static str)),*
        }

        $(pub static $ident: &'static SysError= &SysError::$ident($code, $literal);)*

        impl SysError{
            pub fn code(&self) -> u8 {
               match self{
                   $(SysError::$ident(c,_)=> *c,)*
               }
            }
        }

        impl core::fmt::Display for SysError{
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
               match self{
                   $(SysError::$ident(c,s)=>{write!(f, "{},{}",c, s)},)*
               }
           }
        }
        impl core::fmt::Debug for SysError{
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
               match self{
                   $(SysError::$ident(_,s)=>{write!(f, "{}", s)},)*
               }
           }
        }

        impl PartialEq for SysError{
            fn eq(&self, other: &Self) -> bool {
                self.code() == other.code()
            }
        }
        impl Eq for SysError{}

        impl core::error::Error for SysError{}

        pub type ErrorCode = &'static SysError;

    };
}
