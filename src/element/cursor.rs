/*
** This file is a part of Iksemel (XML parser for Jabber/XMPP)
** Copyright (C) 2000-2025 Gurer Ozen
**
** Iksemel is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

use std::ops::Deref;

use super::Element;

/// Read only position inside an element tree which remembers the way down.
///
/// Elements do not point to their parents, the cursor keeps the ancestors
/// instead so that [parent()](Cursor::parent) and [root()](Cursor::root) work.
#[derive(Clone, Debug)]
pub struct Cursor<'a> {
    stack: Vec<&'a Element>,
}

impl<'a> Cursor<'a> {
    pub fn new(root: &'a Element) -> Cursor<'a> {
        Cursor { stack: vec![root] }
    }

    fn descend(&self, child: &'a Element) -> Cursor<'a> {
        let mut stack = self.stack.clone();
        stack.push(child);
        Cursor { stack }
    }

    pub fn element(&self) -> &'a Element {
        self.stack[self.stack.len() - 1]
    }

    /// Returns `None` only at the root.
    pub fn parent(&self) -> Option<Cursor<'a>> {
        if self.stack.len() < 2 {
            return None;
        }
        Some(Cursor {
            stack: self.stack[..self.stack.len() - 1].to_vec(),
        })
    }

    pub fn root(&self) -> Cursor<'a> {
        Cursor {
            stack: vec![self.stack[0]],
        }
    }

    pub fn first_child(&self, name: &str, namespace: &str) -> Option<Cursor<'a>> {
        self.element()
            .first_child(name, namespace)
            .map(|child| self.descend(child))
    }

    pub fn children(&self) -> impl Iterator<Item = Cursor<'a>> + '_ {
        self.element().children().map(|child| self.descend(child))
    }

    /// Distance from the root, which is at depth zero.
    pub fn depth(&self) -> usize {
        self.stack.len() - 1
    }
}

impl Deref for Cursor<'_> {
    type Target = Element;

    fn deref(&self) -> &Element {
        self.element()
    }
}
