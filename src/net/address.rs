//! IPv4 地址分配
//!
//! 从 `base/mask` 子网中按节点顺序依次分配主机地址（`base+1`、`base+2`、...）。

use std::net::Ipv4Addr;

use super::error::NetError;

/// 节点上的 IPv4 接口
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ipv4Interface {
    pub local: Ipv4Addr,
    pub mask: Ipv4Addr,
}

impl Ipv4Interface {
    /// 子网定向广播地址
    pub fn broadcast(&self) -> Ipv4Addr {
        Ipv4Addr::from(u32::from(self.local) | !u32::from(self.mask))
    }
}

/// 顺序地址分配器
#[derive(Debug, Clone)]
pub struct Ipv4AddressAllocator {
    base: Ipv4Addr,
    mask: Ipv4Addr,
    next_host: u32,
}

impl Ipv4AddressAllocator {
    /// 校验子网：掩码必须连续，基地址不能带主机位。
    pub fn new(base: Ipv4Addr, mask: Ipv4Addr) -> Result<Self, NetError> {
        let m = u32::from(mask);
        if m.leading_ones() + m.trailing_zeros() != 32 {
            return Err(NetError::InvalidMask(mask));
        }
        if u32::from(base) & !m != 0 {
            return Err(NetError::HostBitsInBase { base, mask });
        }
        Ok(Self {
            base,
            mask,
            next_host: 1,
        })
    }

    /// 可分配的主机地址数（不含网络地址与广播地址）
    pub fn capacity(&self) -> u32 {
        (!u32::from(self.mask)).saturating_sub(1)
    }

    /// 分配下一个主机地址
    pub fn allocate(&mut self) -> Result<Ipv4Interface, NetError> {
        if self.next_host > self.capacity() {
            return Err(NetError::AddressesExhausted {
                base: self.base,
                mask: self.mask,
                capacity: self.capacity(),
            });
        }
        let local = Ipv4Addr::from(u32::from(self.base) | self.next_host);
        self.next_host += 1;
        Ok(Ipv4Interface {
            local,
            mask: self.mask,
        })
    }
}
