// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Food orders.
//!
//! Orders reuse the booking transition-table mechanism but have no resource
//! conflicts: a status change is valid iff the table allows it.
//!
//! ```text
//!  placed ──► accepted ──► preparing ──► ready ──► delivered
//!    │           │             │           │
//!    └───────────┴─────────────┴───────────┴──────► cancelled
//! ```
//!
//! Each order line snapshots the menu price at order time, so later menu
//! price changes never alter existing orders.

use crate::base::{GuestId, MenuItemId, OrderId};
use crate::error::{Entity, ReservationError, ValidationError};
use crate::lifecycle::{Lifecycle, ParseStatusError, transition};
use crate::pricing::{from_minor_units, to_minor_units};
use dashmap::DashMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Placed,
    Accepted,
    Preparing,
    Ready,
    Delivered,
    Cancelled,
}

impl Lifecycle for OrderStatus {
    const ENTITY: &'static str = "order";

    fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Placed => "placed",
            OrderStatus::Accepted => "accepted",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Ready => "ready",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    fn successors(self) -> &'static [Self] {
        use OrderStatus::*;
        match self {
            Placed => &[Accepted, Cancelled],
            Accepted => &[Preparing, Cancelled],
            Preparing => &[Ready, Cancelled],
            Ready => &[Delivered, Cancelled],
            Delivered | Cancelled => &[],
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "placed" => Ok(OrderStatus::Placed),
            "accepted" => Ok(OrderStatus::Accepted),
            "preparing" => Ok(OrderStatus::Preparing),
            "ready" => Ok(OrderStatus::Ready),
            "delivered" => Ok(OrderStatus::Delivered),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(ParseStatusError(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: MenuItemId,
    pub name: String,
    pub price: Decimal,
    pub available: bool,
}

/// One order line with the unit price captured when the order was placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FoodOrderItem {
    pub menu_item_id: MenuItemId,
    pub quantity: u32,
    pub unit_price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FoodOrder {
    pub id: OrderId,
    pub guest_id: GuestId,
    pub status: OrderStatus,
    pub items: Vec<FoodOrderItem>,
    pub total: Decimal,
}

/// Menu and order book.
#[derive(Debug)]
pub struct OrderDesk {
    menu: DashMap<MenuItemId, MenuItem>,
    orders: DashMap<OrderId, FoodOrder>,
    next_order_id: AtomicU64,
}

impl OrderDesk {
    pub fn new() -> Self {
        Self {
            menu: DashMap::new(),
            orders: DashMap::new(),
            next_order_id: AtomicU64::new(1),
        }
    }

    /// Adds or replaces a menu item.
    ///
    /// # Errors
    ///
    /// [`ValidationError::InvalidRate`] for negative or sub-cent prices.
    pub fn upsert_menu_item(&self, item: MenuItem) -> Result<(), ReservationError> {
        to_minor_units(item.price)?;
        self.menu.insert(item.id, item);
        Ok(())
    }

    pub fn menu_item(&self, id: MenuItemId) -> Option<MenuItem> {
        self.menu.get(&id).map(|item| item.value().clone())
    }

    /// Places an order, snapshotting current menu prices.
    ///
    /// # Errors
    ///
    /// - [`ValidationError::EmptyOrder`] / [`ValidationError::InvalidQuantity`].
    /// - [`ReservationError::NotFound`] for unknown menu items.
    /// - [`ValidationError::MenuItemUnavailable`] for items off the menu.
    pub fn place_order(
        &self,
        guest_id: GuestId,
        lines: &[(MenuItemId, u32)],
    ) -> Result<FoodOrder, ReservationError> {
        if lines.is_empty() {
            return Err(ValidationError::EmptyOrder.into());
        }

        let mut items = Vec::with_capacity(lines.len());
        let mut total_minor: i64 = 0;
        for &(menu_item_id, quantity) in lines {
            if quantity == 0 {
                return Err(ValidationError::InvalidQuantity.into());
            }
            let item = self
                .menu_item(menu_item_id)
                .ok_or(ReservationError::NotFound(Entity::MenuItem(menu_item_id)))?;
            if !item.available {
                return Err(ValidationError::MenuItemUnavailable(menu_item_id).into());
            }
            total_minor = to_minor_units(item.price)?
                .checked_mul(i64::from(quantity))
                .and_then(|line| line.checked_add(total_minor))
                .ok_or(ValidationError::InvalidRate)?;
            items.push(FoodOrderItem {
                menu_item_id,
                quantity,
                unit_price: item.price,
            });
        }

        let order = FoodOrder {
            id: OrderId(self.next_order_id.fetch_add(1, Ordering::Relaxed)),
            guest_id,
            status: OrderStatus::Placed,
            items,
            total: from_minor_units(total_minor),
        };
        self.orders.insert(order.id, order.clone());
        Ok(order)
    }

    pub fn order(&self, id: OrderId) -> Option<FoodOrder> {
        self.orders.get(&id).map(|order| order.value().clone())
    }

    /// Moves an order to `status`, returning the previous status and the
    /// updated order.
    pub fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<(OrderStatus, FoodOrder), ReservationError> {
        // The entry guard serializes concurrent updates to the same order.
        let mut order = self
            .orders
            .get_mut(&id)
            .ok_or(ReservationError::NotFound(Entity::Order(id)))?;
        let previous = order.status;
        order.status = transition(previous, status)?;
        Ok((previous, order.value().clone()))
    }
}

impl Default for OrderDesk {
    fn default() -> Self {
        Self::new()
    }
}
