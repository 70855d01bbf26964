//! Bit layouts of the system registers touched during bring-up.
//!
//! Every register is described with `register_bitfields!` and handled through a
//! [`RegisterView`], a stack-local 64-bit image that is filled in and then handed to the
//! [`SystemRegisters`](super::SystemRegisters) port in one write. A view never outlives the
//! configuration step that built it.
//!
//! Reserved positions are owned by the view, not by the caller: [`RegisterView::value`] clears
//! every RES0 bit and sets every RES1 bit of the register, whatever was modified before.

use core::fmt;
use tock_registers::{
    fields::{Field, FieldValue, TryFromValue},
    interfaces::{ReadWriteable, Readable},
    register_bitfields,
    registers::InMemoryRegister,
    RegisterLongName,
};

register_bitfields! {u64,
    pub CurrentEL [
        EL OFFSET(2) NUMBITS(2) [
            EL0 = 0,
            EL1 = 1,
            EL2 = 2,
            EL3 = 3
        ]
    ],

    /// Secure Configuration Register, EL3.
    pub SCR_EL3 [
        /// Trap EL2 and lower accesses to the Counter-timer Physical Secure registers.
        ST OFFSET(11) NUMBITS(1) [],

        /// Execution state of the next lower level.
        RW OFFSET(10) NUMBITS(1) [
            AllLowerELsAreAarch32 = 0,
            NextELIsAarch64 = 1
        ],

        SIF OFFSET(9) NUMBITS(1) [],

        /// Hypervisor Call instruction enable.
        HCE OFFSET(8) NUMBITS(1) [
            HvcDisabled = 0,
            HvcEnabled = 1
        ],

        SMD OFFSET(7) NUMBITS(1) [],
        EA OFFSET(3) NUMBITS(1) [],
        FIQ OFFSET(2) NUMBITS(1) [],
        IRQ OFFSET(1) NUMBITS(1) [],

        /// Security state of EL2 and lower.
        NS OFFSET(0) NUMBITS(1) [
            Secure = 0,
            NonSecure = 1
        ]
    ],

    /// Saved Program Status Register, EL3.
    pub SPSR_EL3 [
        N OFFSET(31) NUMBITS(1) [],
        Z OFFSET(30) NUMBITS(1) [],
        C OFFSET(29) NUMBITS(1) [],
        V OFFSET(28) NUMBITS(1) [],
        UAO OFFSET(23) NUMBITS(1) [],
        PAN OFFSET(22) NUMBITS(1) [],
        SS OFFSET(21) NUMBITS(1) [],
        IL OFFSET(20) NUMBITS(1) [],

        D OFFSET(9) NUMBITS(1) [
            Unmasked = 0,
            Masked = 1
        ],
        A OFFSET(8) NUMBITS(1) [
            Unmasked = 0,
            Masked = 1
        ],
        I OFFSET(7) NUMBITS(1) [
            Unmasked = 0,
            Masked = 1
        ],
        F OFFSET(6) NUMBITS(1) [
            Unmasked = 0,
            Masked = 1
        ],

        /// Exception level and stack pointer `eret` returns to. `t` selects SP_EL0.
        M OFFSET(0) NUMBITS(4) [
            EL0t = 0b0000,
            EL1t = 0b0100,
            EL1h = 0b0101,
            EL2t = 0b1000,
            EL2h = 0b1001,
            EL3t = 0b1100,
            EL3h = 0b1101
        ]
    ],

    /// Saved Program Status Register, EL2.
    pub SPSR_EL2 [
        N OFFSET(31) NUMBITS(1) [],
        Z OFFSET(30) NUMBITS(1) [],
        C OFFSET(29) NUMBITS(1) [],
        V OFFSET(28) NUMBITS(1) [],
        TCO OFFSET(25) NUMBITS(1) [],
        DIT OFFSET(24) NUMBITS(1) [],
        UAO OFFSET(23) NUMBITS(1) [],
        PAN OFFSET(22) NUMBITS(1) [],
        SS OFFSET(21) NUMBITS(1) [],
        IL OFFSET(20) NUMBITS(1) [],
        SSBS OFFSET(12) NUMBITS(1) [],
        BTYPE OFFSET(10) NUMBITS(2) [],

        D OFFSET(9) NUMBITS(1) [
            Unmasked = 0,
            Masked = 1
        ],
        A OFFSET(8) NUMBITS(1) [
            Unmasked = 0,
            Masked = 1
        ],
        I OFFSET(7) NUMBITS(1) [
            Unmasked = 0,
            Masked = 1
        ],
        F OFFSET(6) NUMBITS(1) [
            Unmasked = 0,
            Masked = 1
        ],

        M OFFSET(0) NUMBITS(4) [
            EL0t = 0b0000,
            EL1t = 0b0100,
            EL1h = 0b0101,
            EL2t = 0b1000,
            EL2h = 0b1001
        ]
    ],

    /// Hypervisor Configuration Register, EL2.
    pub HCR_EL2 [
        /// Execution state of EL1.
        RW OFFSET(31) NUMBITS(1) [
            AllLowerELsAreAarch32 = 0,
            EL1IsAarch64 = 1
        ],
        TGE OFFSET(27) NUMBITS(1) [],
        AMO OFFSET(5) NUMBITS(1) [],
        IMO OFFSET(4) NUMBITS(1) [],
        FMO OFFSET(3) NUMBITS(1) [],
        SWIO OFFSET(1) NUMBITS(1) [],
        VM OFFSET(0) NUMBITS(1) []
    ],

    /// Counter-timer Hypervisor Control Register, EL2.
    pub CNTHCTL_EL2 [
        /// EL1 and EL0 access to the physical timer registers.
        EL1PCEN OFFSET(1) NUMBITS(1) [],
        /// EL1 and EL0 access to the physical counter.
        EL1PCTEN OFFSET(0) NUMBITS(1) []
    ],

    /// System Control Register, EL1.
    pub SCTLR_EL1 [
        EnIA OFFSET(31) NUMBITS(1) [],
        EnIB OFFSET(30) NUMBITS(1) [],
        /// Load/Store Multiple Atomicity and Ordering Enable.
        LSMAOE OFFSET(29) NUMBITS(1) [],
        /// No Trap Load Multiple and Store Multiple to Device-nGRE/Device-nGnRE/Device-nGnRnE.
        nTLSMD OFFSET(28) NUMBITS(1) [],
        EnDA OFFSET(27) NUMBITS(1) [],
        UCI OFFSET(26) NUMBITS(1) [],
        EE OFFSET(25) NUMBITS(1) [],
        E0E OFFSET(24) NUMBITS(1) [],
        /// Set Privileged Access Never on taking an exception to EL1.
        SPAN OFFSET(23) NUMBITS(1) [],
        /// Implicit Error Synchronization event enable.
        IESB OFFSET(21) NUMBITS(1) [],
        WXN OFFSET(19) NUMBITS(1) [],
        /// Don't trap WFE at EL0.
        nTWE OFFSET(18) NUMBITS(1) [],
        /// Don't trap WFI at EL0.
        nTWI OFFSET(16) NUMBITS(1) [],
        /// Don't trap CTR_EL0 reads at EL0.
        UCT OFFSET(15) NUMBITS(1) [],
        /// Don't trap DC ZVA at EL0.
        DZE OFFSET(14) NUMBITS(1) [],
        EnDB OFFSET(13) NUMBITS(1) [],

        I OFFSET(12) NUMBITS(1) [
            NonCacheable = 0,
            Cacheable = 1
        ],

        /// Don't trap DAIF accesses at EL0.
        UMA OFFSET(9) NUMBITS(1) [],
        SED OFFSET(8) NUMBITS(1) [],
        ITD OFFSET(7) NUMBITS(1) [],
        CP15BEN OFFSET(5) NUMBITS(1) [],
        /// SP alignment check at EL0.
        SA0 OFFSET(4) NUMBITS(1) [],
        /// SP alignment check at EL1.
        SA OFFSET(3) NUMBITS(1) [],

        C OFFSET(2) NUMBITS(1) [
            NonCacheable = 0,
            Cacheable = 1
        ],

        /// Data alignment fault checking.
        A OFFSET(1) NUMBITS(1) [
            Disable = 0,
            Enable = 1
        ],

        /// Stage 1 address translation for EL1&0.
        M OFFSET(0) NUMBITS(1) [
            Disable = 0,
            Enable = 1
        ]
    ],

    /// Translation Control Register, EL1.
    pub TCR_EL1 [
        TBI1 OFFSET(38) NUMBITS(1) [],
        TBI0 OFFSET(37) NUMBITS(1) [],
        AS OFFSET(36) NUMBITS(1) [],

        /// Intermediate Physical Address Size.
        IPS OFFSET(32) NUMBITS(3) [
            Bits_32 = 0b000,
            Bits_36 = 0b001,
            Bits_40 = 0b010,
            Bits_42 = 0b011,
            Bits_44 = 0b100,
            Bits_48 = 0b101,
            Bits_52 = 0b110
        ],

        /// Granule size for TTBR1_EL1. Encoded differently from TG0.
        TG1 OFFSET(30) NUMBITS(2) [
            KiB_16 = 0b01,
            KiB_4 = 0b10,
            KiB_64 = 0b11
        ],

        SH1 OFFSET(28) NUMBITS(2) [
            None = 0b00,
            Outer = 0b10,
            Inner = 0b11
        ],

        ORGN1 OFFSET(26) NUMBITS(2) [
            NonCacheable = 0b00,
            WriteBack_ReadAlloc_WriteAlloc_Cacheable = 0b01,
            WriteThrough_ReadAlloc_NoWriteAlloc_Cacheable = 0b10,
            WriteBack_ReadAlloc_NoWriteAlloc_Cacheable = 0b11
        ],

        IRGN1 OFFSET(24) NUMBITS(2) [
            NonCacheable = 0b00,
            WriteBack_ReadAlloc_WriteAlloc_Cacheable = 0b01,
            WriteThrough_ReadAlloc_NoWriteAlloc_Cacheable = 0b10,
            WriteBack_ReadAlloc_NoWriteAlloc_Cacheable = 0b11
        ],

        EPD1 OFFSET(23) NUMBITS(1) [
            EnableTTBR1Walks = 0,
            DisableTTBR1Walks = 1
        ],

        A1 OFFSET(22) NUMBITS(1) [
            TTBR0 = 0,
            TTBR1 = 1
        ],

        T1SZ OFFSET(16) NUMBITS(6) [],

        TG0 OFFSET(14) NUMBITS(2) [
            KiB_4 = 0b00,
            KiB_64 = 0b01,
            KiB_16 = 0b10
        ],

        SH0 OFFSET(12) NUMBITS(2) [
            None = 0b00,
            Outer = 0b10,
            Inner = 0b11
        ],

        ORGN0 OFFSET(10) NUMBITS(2) [
            NonCacheable = 0b00,
            WriteBack_ReadAlloc_WriteAlloc_Cacheable = 0b01,
            WriteThrough_ReadAlloc_NoWriteAlloc_Cacheable = 0b10,
            WriteBack_ReadAlloc_NoWriteAlloc_Cacheable = 0b11
        ],

        IRGN0 OFFSET(8) NUMBITS(2) [
            NonCacheable = 0b00,
            WriteBack_ReadAlloc_WriteAlloc_Cacheable = 0b01,
            WriteThrough_ReadAlloc_NoWriteAlloc_Cacheable = 0b10,
            WriteBack_ReadAlloc_NoWriteAlloc_Cacheable = 0b11
        ],

        EPD0 OFFSET(7) NUMBITS(1) [
            EnableTTBR0Walks = 0,
            DisableTTBR0Walks = 1
        ],

        T0SZ OFFSET(0) NUMBITS(6) []
    ],

    /// Memory Attribute Indirection Register, EL1.
    pub MAIR_EL1 [
        Attr7 OFFSET(56) NUMBITS(8) [],
        Attr6 OFFSET(48) NUMBITS(8) [],
        Attr5 OFFSET(40) NUMBITS(8) [],
        Attr4 OFFSET(32) NUMBITS(8) [],
        Attr3 OFFSET(24) NUMBITS(8) [],
        Attr2 OFFSET(16) NUMBITS(8) [],

        Attr1 OFFSET(8) NUMBITS(8) [
            Device_nGnRnE = 0b0000_0000,
            Device_nGnRE = 0b0000_0100
        ],

        Attr0 OFFSET(0) NUMBITS(8) [
            /// Normal, inner and outer write-back non-transient, read/write-allocate.
            Normal_WriteBack_NonTransient_ReadWriteAlloc = 0b1111_1111
        ]
    ],

    /// AArch64 Memory Model Feature Register 0.
    pub ID_AA64MMFR0_EL1 [
        TGran4 OFFSET(28) NUMBITS(4) [
            Supported = 0b0000,
            Supported52Bit = 0b0001,
            NotSupported = 0b1111
        ],

        PARange OFFSET(0) NUMBITS(4) [
            Bits_32 = 0b0000,
            Bits_36 = 0b0001,
            Bits_40 = 0b0010,
            Bits_42 = 0b0011,
            Bits_44 = 0b0100,
            Bits_48 = 0b0101,
            Bits_52 = 0b0110
        ]
    ]
}

/// Architecturally fixed bits of a register.
pub trait ReservedBits: RegisterLongName {
    /// Bits that must read and write as zero.
    const RES0: u64 = 0;
    /// Bits that must be written as one.
    const RES1: u64 = 0;
}

impl ReservedBits for CurrentEL::Register {}

impl ReservedBits for SCR_EL3::Register {
    const RES0: u64 = (1 << 6) | (0b111 << 22) | (1 << 34) | (!0 << 39);
    const RES1: u64 = (1 << 5) | (1 << 4);
}

impl ReservedBits for SPSR_EL3::Register {
    const RES0: u64 = (0xFFFF_FFFF << 32) | (0xF << 24) | (0x3FF << 10) | (1 << 5) | (1 << 4);
}

impl ReservedBits for SPSR_EL2::Register {
    const RES0: u64 = (0xFFFF_FFFF << 32) | (0b11 << 26) | (0x7F << 13) | (1 << 5) | (1 << 4);
}

impl ReservedBits for HCR_EL2::Register {
    const RES0: u64 = (!0 << 45) | (1 << 39);
}

impl ReservedBits for CNTHCTL_EL2::Register {}

impl ReservedBits for SCTLR_EL1::Register {
    const RES0: u64 =
        (0x3F << 58) | (0xF << 50) | (0b111 << 32) | (1 << 17) | (1 << 10) | (1 << 6);
    const RES1: u64 = (1 << 22) | (1 << 20) | (1 << 11);
}

impl ReservedBits for TCR_EL1::Register {
    const RES0: u64 = (0xF << 60) | (1 << 35) | (1 << 6);
}

impl ReservedBits for MAIR_EL1::Register {}

impl ReservedBits for ID_AA64MMFR0_EL1::Register {}

/// A 64-bit image of one system register.
pub struct RegisterView<R: ReservedBits> {
    reg: InMemoryRegister<u64, R>,
    /// Bits in RES0 positions that the hardware itself reported, see [`RegisterView::read_back`].
    kept: u64,
}

pub type CurrentLevel = RegisterView<CurrentEL::Register>;
pub type SecureConfiguration = RegisterView<SCR_EL3::Register>;
pub type SavedStatusEl3 = RegisterView<SPSR_EL3::Register>;
pub type SavedStatusEl2 = RegisterView<SPSR_EL2::Register>;
pub type HypervisorConfiguration = RegisterView<HCR_EL2::Register>;
pub type CounterTimerHypControl = RegisterView<CNTHCTL_EL2::Register>;
pub type SystemControl = RegisterView<SCTLR_EL1::Register>;
pub type TranslationControl = RegisterView<TCR_EL1::Register>;
pub type MemoryAttributes = RegisterView<MAIR_EL1::Register>;
pub type MemoryModelFeatures = RegisterView<ID_AA64MMFR0_EL1::Register>;

impl<R: ReservedBits> RegisterView<R> {
    /// Canonical default: every field zero, RES1 bits set.
    pub fn new() -> Self {
        Self::from_raw(R::RES1)
    }

    /// View of an arbitrary raw value. Its reserved bits are forced like any other write.
    pub fn from_raw(raw: u64) -> Self {
        Self {
            reg: InMemoryRegister::new(raw),
            kept: 0,
        }
    }

    /// View of a value just read from the register, for a read-modify-write.
    ///
    /// Bits this view treats as RES0 but the core reported set belong to fields newer than this
    /// layout, and are written back unchanged.
    pub fn read_back(raw: u64) -> Self {
        Self {
            reg: InMemoryRegister::new(raw),
            kept: raw & R::RES0,
        }
    }

    pub fn modify(&self, field: FieldValue<u64, R>) -> &Self {
        self.reg.modify(field);
        self
    }

    pub fn read(&self, field: Field<u64, R>) -> u64 {
        self.reg.read(field)
    }

    pub fn read_as_enum<E: TryFromValue<u64, EnumType = E>>(
        &self,
        field: Field<u64, R>,
    ) -> Option<E> {
        self.reg.read_as_enum(field)
    }

    pub fn is_set(&self, field: Field<u64, R>) -> bool {
        self.reg.is_set(field)
    }

    pub fn matches_all(&self, field: FieldValue<u64, R>) -> bool {
        self.reg.matches_all(field)
    }

    /// The value to put on the wire, with the reserved bits forced.
    pub fn value(&self) -> u64 {
        (self.reg.get() & !R::RES0) | R::RES1 | self.kept
    }
}

impl<R: ReservedBits> Default for RegisterView<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: ReservedBits> fmt::Display for RegisterView<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.value())
    }
}

impl<R: ReservedBits> fmt::Debug for RegisterView<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#066b}", self.value())
    }
}

impl RegisterView<SCTLR_EL1::Register> {
    /// Default EL1 control state. Anything that needs to know the "reset" kernel configuration
    /// starts from here.
    pub fn baseline() -> Self {
        let sctlr = Self::new();
        sctlr.modify(
            SCTLR_EL1::LSMAOE::SET
                + SCTLR_EL1::nTLSMD::SET
                + SCTLR_EL1::SPAN::SET
                + SCTLR_EL1::IESB::SET,
        );
        sctlr
    }
}
